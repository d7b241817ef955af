//! Error types for kisa.

use thiserror::Error;

/// Client result type.
pub type KisaResult<T> = Result<T, KisaError>;

/// Client error type.
///
/// Every failure a caller can observe falls into one of three kinds. Transport
/// failures of any cause surface as [`KisaError::ConnectionFailed`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KisaError {
    /// The caller supplied a missing or invalid input. Raised before any I/O.
    #[error("{0}")]
    InvalidArgument(String),

    /// The server answered with a non-success status.
    #[error("{0}")]
    RequestFailed(String),

    /// The transport could not complete the exchange.
    #[error("Connection failed")]
    ConnectionFailed,
}

impl KisaError {
    /// Shorthand for an [`KisaError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for a [`KisaError::RequestFailed`].
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed(message.into())
    }

    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    #[must_use]
    pub const fn is_request_failed(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    #[must_use]
    pub const fn is_connection_failed(&self) -> bool {
        matches!(self, Self::ConnectionFailed)
    }
}

// === From implementations ===

impl From<url::ParseError> for KisaError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidArgument(format!("invalid url: {err}"))
    }
}

impl From<reqwest::Error> for KisaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::InvalidArgument(err.to_string());
        }

        tracing::debug!(error = %err, "Transport error");
        Self::ConnectionFailed
    }
}

impl From<reqwest::header::InvalidHeaderValue> for KisaError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidArgument(format!("invalid header value: {err}"))
    }
}
