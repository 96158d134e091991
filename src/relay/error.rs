//! Typed relay failures.
//!
//! Each variant is one row of the relay's error table; the HTTP translation
//! lives in `http::response`.

use axum::http::{Method, StatusCode};
use thiserror::Error;

/// Failure to obtain a response from the upstream target.
///
/// A non-2xx upstream status is not a transport failure; only the inability
/// to complete the exchange is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connect or read deadline elapsed.
    #[error("timed out contacting target: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, TLS failure.
    #[error("failed to connect to target: {0}")]
    Connect(String),

    /// The client rejected the target URL before sending.
    #[error("invalid target url: {0}")]
    InvalidUrl(String),

    /// Any other failure while sending or reading the response.
    #[error("request to target failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let detail = err.to_string();
        if err.is_timeout() {
            TransportError::Timeout(detail)
        } else if err.is_connect() {
            TransportError::Connect(detail)
        } else if err.is_builder() {
            TransportError::InvalidUrl(detail)
        } else {
            TransportError::Request(detail)
        }
    }
}

/// Failure of a single relayed request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The `url` query parameter is absent or empty.
    #[error("no target url provided")]
    MissingUrl,

    /// A method other than GET/POST reached the forwarding step.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The inbound method is not served by the relay at all.
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    /// Declared body length exceeds the configured limit.
    #[error("request body of {0} bytes exceeds limit")]
    PayloadTooLarge(u64),

    /// The upstream could not be contacted.
    #[error(transparent)]
    Upstream(#[from] TransportError),

    /// Anything else, including a missing or malformed Content-Length.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Status code sent back to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl | RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Emit the log line for this failure at the level its class deserves.
    pub fn log(&self) {
        match self {
            RelayError::MissingUrl => tracing::debug!("Request without target url"),
            RelayError::BadRequest(message) => tracing::warn!(%message, "Bad request"),
            RelayError::MethodNotAllowed(method) => {
                tracing::warn!(%method, "Method not allowed")
            }
            RelayError::PayloadTooLarge(length) => {
                tracing::warn!(content_length = length, "Request body too large")
            }
            RelayError::Upstream(err) => tracing::error!(error = %err, "Error contacting target URL"),
            RelayError::Internal(message) => tracing::error!(%message, "Unexpected error"),
        }
    }
}
