//! `reqwest`-backed transport.

use std::error::Error as _;

use async_trait::async_trait;
use futures::StreamExt;
use kisa_common::{HttpConfig, KisaResult};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{RawResponse, StreamEvent, Transport, TransportError};
use crate::sse;

/// Transport issuing real HTTP requests against a base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport that sends `headers` with every request.
    pub fn new(base_url: Url, headers: HeaderMap, http: &HttpConfig) -> KisaResult<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(http.user_agent.as_str())
            .connect_timeout(http.connect_timeout());

        if let Some(timeout) = http.timeout() {
            builder = builder.timeout(timeout);
        }
        if http.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }

    async fn buffer(response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        let url = self.url(path)?;
        debug!(method = "GET", url = %url, "Sending request");

        let response = self.client.get(url).send().await?;
        Self::buffer(response).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<RawResponse, TransportError> {
        let url = self.url(path)?;
        debug!(method = "POST", url = %url, has_body = body.is_some(), "Sending request");

        let mut request = self.client.post(url);
        if let Some(body) = body {
            let bytes =
                serde_json::to_vec(body).map_err(|e| TransportError::Other(e.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = request.send().await?;
        Self::buffer(response).await
    }

    async fn stream(
        &self,
        path: &str,
        on_event: &mut (dyn FnMut(StreamEvent) + Send),
    ) -> Result<(), TransportError> {
        let url = self.url(path)?;
        debug!(method = "GET", url = %url, "Opening event stream");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut events = std::pin::pin!(sse::decode(response.bytes_stream()));
        while let Some(event) = events.next().await {
            let event = event?;
            debug!(event = %event.event, "Stream event received");
            on_event(event);
        }

        Ok(())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let classified = if err.is_timeout() {
            Self::Timeout
        } else if is_tls_failure(&err) {
            Self::Tls(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Other(err.to_string())
        };

        warn!(error = %classified, "HTTP transport failure");
        classified
    }
}

/// rustls reports handshake and certificate failures as `InvalidData` I/O errors.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::InvalidData)
        {
            return true;
        }
        source = cause.source();
    }
    false
}
