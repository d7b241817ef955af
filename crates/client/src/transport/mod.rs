//! HTTP transport seam.
//!
//! The [`Client`](crate::Client) never talks to the network directly. It hands
//! fully-formed paths to a [`Transport`], which owns the base URL and default
//! headers and reports either a [`RawResponse`] or a [`TransportError`].

use async_trait::async_trait;
use kisa_common::KisaError;
use serde_json::Value;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod http;

pub use self::http::ReqwestTransport;

/// A single event received on a streaming connection.
///
/// The payload is passed through as received; callers interpret any JSON in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Event type label, e.g. `update` or `notification`.
    pub event: String,
    /// Raw event payload.
    pub data: String,
}

impl StreamEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Status and body of a completed REST exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure reported by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("TLS failure: {0}")]
    Tls(String),
    /// A streaming request was answered with a non-success status.
    #[error("unexpected status: {status} {body}")]
    Status { status: u16, body: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<TransportError> for KisaError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidUrl(message) => Self::InvalidArgument(message),
            TransportError::Status { status, body } => {
                Self::RequestFailed(format!("Failed to open stream: {status} {body}"))
            }
            TransportError::Connect(_)
            | TransportError::Timeout
            | TransportError::Tls(_)
            | TransportError::Other(_) => Self::ConnectionFailed,
        }
    }
}

/// Outbound HTTP exchange used by the client.
///
/// Paths are absolute (`/api/v1/...`) and may carry a query string.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and buffer the response.
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError>;

    /// Issue a POST request, with `body` sent as JSON when present.
    async fn post(&self, path: &str, body: Option<&Value>) -> Result<RawResponse, TransportError>;

    /// Issue a streaming GET request.
    ///
    /// `on_event` is called inline, in arrival order, once per event. Returns when
    /// the server closes the response.
    async fn stream(
        &self,
        path: &str,
        on_event: &mut (dyn FnMut(StreamEvent) + Send),
    ) -> Result<(), TransportError>;
}
