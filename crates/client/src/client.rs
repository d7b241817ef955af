//! API client facade.
//!
//! Every call validates its arguments, hands a path to the [`Transport`], and
//! turns the outcome into a [`KisaResult`]. Nothing is retried or cached.

use kisa_common::{Config, HttpConfig, KisaError, KisaResult};
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use crate::endpoint::{self, StreamEndpoint};
use crate::query::QueryParams;
use crate::transport::{RawResponse, ReqwestTransport, StreamEvent, Transport};
use crate::visibility::Visibility;

/// Client for a Mastodon-compatible server.
///
/// The handle is immutable once built, so one client can drive several
/// concurrent streams from separate tasks.
#[derive(Debug)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
}

/// Builder for a [`Client`] backed by [`ReqwestTransport`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    url: Option<String>,
    headers: Option<HeaderMap>,
    http: HttpConfig,
}

impl ClientBuilder {
    /// Base URL of the instance.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Headers sent with every request, typically `Authorization`.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Timeouts, user agent and proxy settings. Defaults to [`HttpConfig::default`].
    #[must_use]
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Validate the settings and prepare the transport. No I/O happens here.
    pub fn build(self) -> KisaResult<Client> {
        let url = self
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| KisaError::invalid_argument("url is required"))?;
        let headers = self
            .headers
            .ok_or_else(|| KisaError::invalid_argument("headers are required"))?;

        let base_url = Url::parse(&url)?;
        let transport = ReqwestTransport::new(base_url, headers, &self.http)?;

        Ok(Client { transport })
    }
}

impl Client {
    /// Start building a client over the `reqwest` transport.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client for `url` sending `headers` with every request.
    pub fn new(url: &str, headers: HeaderMap) -> KisaResult<Self> {
        Self::builder().url(url).headers(headers).build()
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> KisaResult<Self> {
        Self::builder()
            .url(config.server.url.as_str())
            .headers(config.default_headers()?)
            .http(config.http.clone())
            .build()
    }
}

impl<T: Transport> Client<T> {
    /// Wrap an existing transport.
    pub const fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The transport requests are delegated to.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    // === Streaming ===

    /// Open a streaming feed and deliver each event to `on_event`.
    ///
    /// Runs until the server closes the response. Events are delivered inline,
    /// in arrival order. A failure after some events were delivered is returned
    /// at that point; delivered events are not retracted.
    pub async fn open_stream<F>(&self, endpoint: StreamEndpoint, on_event: Option<F>) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        let Some(mut on_event) = on_event else {
            return Err(KisaError::invalid_argument("a stream callback is required"));
        };

        info!(stream = %endpoint, "Opening stream");
        self.transport
            .stream(endpoint.path(), &mut on_event)
            .await
            .map_err(KisaError::from)?;
        info!(stream = %endpoint, "Stream closed by server");

        Ok(())
    }

    /// GET /api/v1/streaming/user - Home timeline and notifications of the token's account.
    pub async fn user_stream<F>(&self, on_event: F) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        self.open_stream(StreamEndpoint::User, Some(on_event)).await
    }

    /// GET /api/v1/streaming/health - Server liveness feed.
    pub async fn health_stream<F>(&self, on_event: F) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        self.open_stream(StreamEndpoint::Health, Some(on_event)).await
    }

    /// GET /api/v1/streaming/user/notification - Notifications only.
    pub async fn notification_stream<F>(&self, on_event: F) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        self.open_stream(StreamEndpoint::Notification, Some(on_event))
            .await
    }

    /// GET /api/v1/streaming/public - Federated public timeline.
    pub async fn public_stream<F>(&self, on_event: F) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        self.open_stream(StreamEndpoint::Public, Some(on_event)).await
    }

    /// GET /api/v1/streaming/public/local - Public statuses from this instance.
    pub async fn public_local_stream<F>(&self, on_event: F) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        self.open_stream(StreamEndpoint::PublicLocal, Some(on_event))
            .await
    }

    /// GET /api/v1/streaming/public/remote - Public statuses from other instances.
    pub async fn public_remote_stream<F>(&self, on_event: F) -> KisaResult<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        self.open_stream(StreamEndpoint::PublicRemote, Some(on_event))
            .await
    }

    // === Timelines ===

    /// GET /api/v1/timelines/tag/{hashtag} - Statuses carrying a hashtag.
    ///
    /// One leading `#` is stripped. Parameters outside the allow-list are
    /// dropped; see [`QueryParams::to_query_string`].
    pub async fn hashtag_timeline(&self, hashtag: &str, params: &QueryParams) -> KisaResult<Value> {
        if hashtag.is_empty() {
            return Err(KisaError::invalid_argument("hashtag is required"));
        }

        let hashtag = hashtag.strip_prefix('#').unwrap_or(hashtag);

        let mut path = endpoint::hashtag_timeline(hashtag);
        let query = params.to_query_string();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }

        debug!(hashtag = %hashtag, path = %path, "Fetching hashtag timeline");
        let response = self.transport.get(&path).await?;

        parse_response(response, "Failed to fetch hashtag timeline")
    }

    // === Status actions ===

    /// POST /api/v1/statuses/{id}/reblog - Boost a status publicly.
    pub async fn boost(&self, status_id: &str) -> KisaResult<Value> {
        self.boost_as(status_id, Visibility::default()).await
    }

    /// Boost a status with a visibility given by name.
    ///
    /// Accepts `public`, `unlisted`, `private` or `direct`.
    pub async fn boost_with_visibility(&self, status_id: &str, visibility: &str) -> KisaResult<Value> {
        require_status_id(status_id)?;
        let visibility = visibility.parse::<Visibility>()?;

        self.boost_as(status_id, visibility).await
    }

    /// Boost a status with a typed visibility.
    pub async fn boost_as(&self, status_id: &str, visibility: Visibility) -> KisaResult<Value> {
        require_status_id(status_id)?;

        let body = json!({ "visibility": visibility });
        debug!(status_id = %status_id, visibility = %visibility, "Boosting status");
        let response = self
            .transport
            .post(&endpoint::reblog(status_id), Some(&body))
            .await?;

        parse_response(response, "Failed to boost status")
    }

    /// POST /api/v1/statuses/{id}/favourite - Favourite a status.
    pub async fn favourite(&self, status_id: &str) -> KisaResult<Value> {
        require_status_id(status_id)?;

        debug!(status_id = %status_id, "Favouriting status");
        let response = self
            .transport
            .post(&endpoint::favourite(status_id), None)
            .await?;

        parse_response(response, "Failed to favourite status")
    }
}

fn require_status_id(status_id: &str) -> KisaResult<()> {
    if status_id.is_empty() {
        return Err(KisaError::invalid_argument("status_id is required"));
    }
    Ok(())
}

/// Check the status and decode the body as JSON.
fn parse_response(response: RawResponse, context: &str) -> KisaResult<Value> {
    if !response.is_success() {
        warn!(status = response.status, context, "Request failed");
        return Err(KisaError::RequestFailed(format!(
            "{context}: {} {}",
            response.status, response.body
        )));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| KisaError::RequestFailed(format!("Invalid JSON response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use crate::transport::mock::{MockMethod, MockTransport, RecordedRequest};
    use reqwest::header::{AUTHORIZATION, HeaderValue};

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("dummy_token"));
        headers
    }

    fn client(transport: MockTransport) -> Client<MockTransport> {
        Client::with_transport(transport)
    }

    fn transport_failures() -> [TransportError; 3] {
        [
            TransportError::Connect("connection refused".to_string()),
            TransportError::Timeout,
            TransportError::Tls("certificate verify failed".to_string()),
        ]
    }

    // === Construction ===

    #[test]
    fn test_new_requires_url() {
        let err = Client::builder().headers(headers()).build().unwrap_err();
        assert_eq!(err, KisaError::invalid_argument("url is required"));

        let err = Client::new("", headers()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_new_requires_headers() {
        let err = Client::builder()
            .url("https://www.example.com")
            .build()
            .unwrap_err();
        assert_eq!(err, KisaError::invalid_argument("headers are required"));
    }

    #[test]
    fn test_new_rejects_unparseable_url() {
        let err = Client::new("not a url", headers()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_new_with_correct_arguments() {
        let client = Client::new("https://www.example.com", headers()).unwrap();
        assert_eq!(
            client.transport().base_url().as_str(),
            "https://www.example.com/"
        );
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            url = "https://mastodon.example"
            access_token = "token"
            "#,
        )
        .unwrap();

        assert!(Client::from_config(&config).is_ok());
    }

    // === Streaming ===

    #[tokio::test]
    async fn test_stream_requires_callback() {
        for endpoint in StreamEndpoint::ALL {
            let client = client(MockTransport::new());
            let err = client
                .open_stream(endpoint, None::<fn(StreamEvent)>)
                .await
                .unwrap_err();

            assert!(err.is_invalid_argument());
            assert!(client.transport().requests().is_empty());
        }
    }

    #[tokio::test]
    async fn test_stream_with_callback_succeeds() {
        for endpoint in StreamEndpoint::ALL {
            let client = client(MockTransport::new());
            client
                .open_stream(endpoint, Some(|_event: StreamEvent| {}))
                .await
                .unwrap();

            assert_eq!(
                client.transport().last_request(),
                Some(RecordedRequest {
                    method: MockMethod::Stream,
                    path: endpoint.path().to_string(),
                    body: None,
                })
            );
        }
    }

    #[tokio::test]
    async fn test_named_streams_use_their_paths() {
        let client = client(MockTransport::new());

        client.user_stream(|_| {}).await.unwrap();
        client.health_stream(|_| {}).await.unwrap();
        client.notification_stream(|_| {}).await.unwrap();
        client.public_stream(|_| {}).await.unwrap();
        client.public_local_stream(|_| {}).await.unwrap();
        client.public_remote_stream(|_| {}).await.unwrap();

        let paths: Vec<String> = client
            .transport()
            .requests()
            .into_iter()
            .map(|request| request.path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "/api/v1/streaming/user",
                "/api/v1/streaming/health",
                "/api/v1/streaming/user/notification",
                "/api/v1/streaming/public",
                "/api/v1/streaming/public/local",
                "/api/v1/streaming/public/remote",
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_delivers_events_in_order() {
        let events = vec![
            StreamEvent::new("event", r#"{"type":"update","data":"first message"}"#),
            StreamEvent::new("event", r#"{"type":"notification","data":"second message"}"#),
            StreamEvent::new("event", r#"{"type":"update","data":"third message"}"#),
        ];
        let client = client(MockTransport::new().with_events(events.clone()));

        let mut received = Vec::new();
        client
            .user_stream(|event| received.push(event))
            .await
            .unwrap();

        assert_eq!(received, events);
    }

    #[tokio::test]
    async fn test_stream_transport_failures_are_connection_failed() {
        for failure in transport_failures() {
            let client = client(MockTransport::new().with_stream_error(failure));
            let err = client.user_stream(|_| {}).await.unwrap_err();

            assert_eq!(err, KisaError::ConnectionFailed);
        }
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_delivered_events() {
        let client = client(
            MockTransport::new()
                .with_events([StreamEvent::new("update", "1"), StreamEvent::new("update", "2")])
                .with_stream_error(TransportError::Other("connection reset".to_string())),
        );

        let mut received = Vec::new();
        let err = client
            .public_stream(|event| received.push(event.data))
            .await
            .unwrap_err();

        assert_eq!(err, KisaError::ConnectionFailed);
        assert_eq!(received, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_stream_rejected_by_server() {
        let client = client(MockTransport::new().with_stream_error(TransportError::Status {
            status: 401,
            body: "The access token is invalid".to_string(),
        }));

        let err = client.user_stream(|_| {}).await.unwrap_err();
        assert_eq!(
            err,
            KisaError::request_failed("Failed to open stream: 401 The access token is invalid")
        );
    }

    // === Hashtag timeline ===

    #[tokio::test]
    async fn test_hashtag_timeline_requires_hashtag() {
        let client = client(MockTransport::new());
        let err = client
            .hashtag_timeline("", &QueryParams::new())
            .await
            .unwrap_err();

        assert_eq!(err, KisaError::invalid_argument("hashtag is required"));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_hashtag_timeline_strips_hash_without_query() {
        let client = client(MockTransport::new().with_response(200, "[]"));
        client
            .hashtag_timeline("#ruby", &QueryParams::new())
            .await
            .unwrap();

        assert_eq!(
            client.transport().last_request(),
            Some(RecordedRequest {
                method: MockMethod::Get,
                path: "/api/v1/timelines/tag/ruby".to_string(),
                body: None,
            })
        );
    }

    #[tokio::test]
    async fn test_hashtag_timeline_strips_only_one_hash() {
        let client = client(MockTransport::new().with_response(200, "[]"));
        client
            .hashtag_timeline("##ruby", &QueryParams::new())
            .await
            .unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.path, "/api/v1/timelines/tag/%23ruby");
    }

    #[tokio::test]
    async fn test_hashtag_timeline_scalar_params() {
        let client = client(MockTransport::new().with_response(200, "[]"));
        let params = QueryParams::new()
            .with("limit", 10)
            .with("local", true)
            .with("only_media", true);

        client.hashtag_timeline("ruby", &params).await.unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(
            request.path,
            "/api/v1/timelines/tag/ruby?limit=10&local=true&only_media=true"
        );
    }

    #[tokio::test]
    async fn test_hashtag_timeline_array_params() {
        let client = client(MockTransport::new().with_response(200, "[]"));
        let params = QueryParams::new()
            .with("any", vec!["tech", "programming"])
            .with("all", vec!["news"])
            .with("limit", 5);

        client.hashtag_timeline("ruby", &params).await.unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(
            request.path,
            "/api/v1/timelines/tag/ruby?any[]=tech&any[]=programming&all[]=news&limit=5"
        );
    }

    #[tokio::test]
    async fn test_hashtag_timeline_drops_unknown_params() {
        let client = client(MockTransport::new().with_response(200, "[]"));
        let params = QueryParams::new()
            .with("invalid_param", "value")
            .with("limit", 20);

        client.hashtag_timeline("ruby", &params).await.unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.path, "/api/v1/timelines/tag/ruby?limit=20");
    }

    #[tokio::test]
    async fn test_hashtag_timeline_only_unknown_params_leaves_no_question_mark() {
        let client = client(MockTransport::new().with_response(200, "[]"));
        let params = QueryParams::new().with("invalid_param", "value");

        client.hashtag_timeline("ruby", &params).await.unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.path, "/api/v1/timelines/tag/ruby");
    }

    #[tokio::test]
    async fn test_hashtag_timeline_returns_body_verbatim() {
        let body = r#"[{"id":"1","content":"<p>#ruby</p>"},{"id":"2","content":"hi"}]"#;
        let client = client(MockTransport::new().with_response(200, body));

        let statuses = client
            .hashtag_timeline("ruby", &QueryParams::new())
            .await
            .unwrap();

        assert_eq!(
            statuses,
            json!([{"id":"1","content":"<p>#ruby</p>"},{"id":"2","content":"hi"}])
        );
    }

    #[tokio::test]
    async fn test_hashtag_timeline_not_found() {
        let client = client(MockTransport::new().with_response(404, "Not found"));
        let err = client
            .hashtag_timeline("ruby", &QueryParams::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            KisaError::request_failed("Failed to fetch hashtag timeline: 404 Not found")
        );
    }

    #[tokio::test]
    async fn test_hashtag_timeline_transport_failures() {
        for failure in transport_failures() {
            let client = client(MockTransport::new().with_error(failure));
            let err = client
                .hashtag_timeline("ruby", &QueryParams::new())
                .await
                .unwrap_err();

            assert_eq!(err, KisaError::ConnectionFailed);
        }
    }

    #[tokio::test]
    async fn test_hashtag_timeline_invalid_json() {
        let client = client(MockTransport::new().with_response(200, "<html>"));
        let err = client
            .hashtag_timeline("ruby", &QueryParams::new())
            .await
            .unwrap_err();

        assert!(err.is_request_failed());
    }

    // === Boost ===

    #[tokio::test]
    async fn test_boost_requires_status_id() {
        let client = client(MockTransport::new());

        assert_eq!(
            client.boost("").await.unwrap_err(),
            KisaError::invalid_argument("status_id is required")
        );
        assert_eq!(
            client.boost_with_visibility("", "public").await.unwrap_err(),
            KisaError::invalid_argument("status_id is required")
        );
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_boost_rejects_invalid_visibility() {
        let client = client(MockTransport::new());
        let err = client
            .boost_with_visibility("123456", "invalid")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            KisaError::invalid_argument(
                "visibility must be one of: public, unlisted, private, direct"
            )
        );
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_boost_defaults_to_public() {
        let client = client(MockTransport::new().with_response(200, r#"{"id":"999","reblogged":true}"#));
        let status = client.boost("123456").await.unwrap();

        assert_eq!(status["reblogged"], json!(true));
        assert_eq!(
            client.transport().last_request(),
            Some(RecordedRequest {
                method: MockMethod::Post,
                path: "/api/v1/statuses/123456/reblog".to_string(),
                body: Some(json!({"visibility": "public"})),
            })
        );
    }

    #[tokio::test]
    async fn test_boost_with_each_visibility() {
        for visibility in ["public", "unlisted", "private", "direct"] {
            let client = client(MockTransport::new());
            client
                .boost_with_visibility("123456", visibility)
                .await
                .unwrap();

            let request = client.transport().last_request().unwrap();
            assert_eq!(request.body, Some(json!({ "visibility": visibility })));
        }
    }

    #[tokio::test]
    async fn test_boost_failure_status() {
        let client = client(MockTransport::new().with_response(422, r#"{"error":"Validation failed"}"#));
        let err = client.boost("123456").await.unwrap_err();

        assert_eq!(
            err,
            KisaError::request_failed(
                r#"Failed to boost status: 422 {"error":"Validation failed"}"#
            )
        );
    }

    #[tokio::test]
    async fn test_boost_transport_failures() {
        for failure in transport_failures() {
            let client = client(MockTransport::new().with_error(failure));
            assert_eq!(
                client.boost("123456").await.unwrap_err(),
                KisaError::ConnectionFailed
            );
        }
    }

    // === Favourite ===

    #[tokio::test]
    async fn test_favourite_requires_status_id() {
        let client = client(MockTransport::new());
        let err = client.favourite("").await.unwrap_err();

        assert_eq!(err, KisaError::invalid_argument("status_id is required"));
    }

    #[tokio::test]
    async fn test_favourite_posts_without_body() {
        let client = client(MockTransport::new().with_response(200, r#"{"id":"123456","favourited":true}"#));
        let status = client.favourite("123456").await.unwrap();

        assert_eq!(status, json!({"id": "123456", "favourited": true}));
        assert_eq!(
            client.transport().last_request(),
            Some(RecordedRequest {
                method: MockMethod::Post,
                path: "/api/v1/statuses/123456/favourite".to_string(),
                body: None,
            })
        );
    }

    #[tokio::test]
    async fn test_favourite_failure_status() {
        let client = client(MockTransport::new().with_response(404, "Record not found"));
        let err = client.favourite("123456").await.unwrap_err();

        assert_eq!(
            err,
            KisaError::request_failed("Failed to favourite status: 404 Record not found")
        );
    }

    #[tokio::test]
    async fn test_favourite_transport_failures() {
        for failure in transport_failures() {
            let client = client(MockTransport::new().with_error(failure));
            assert_eq!(
                client.favourite("123456").await.unwrap_err(),
                KisaError::ConnectionFailed
            );
        }
    }
}
