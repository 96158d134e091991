//! Response translation.
//!
//! # Responsibilities
//! - Relay a successful upstream answer: same status, raw body, JSON content type
//! - Map each `RelayError` to its fixed status and JSON error body
//! - Produce the catch-all body for requests that panicked
//!
//! # Design Decisions
//! - Bodies are written as literal bytes, never re-encoded
//! - The missing-url response carries no Content-Type
//! - CORS headers are not added here; the router layers add them to everything

use std::any::Any;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::relay::{RelayError, UpstreamResponse};

pub const MISSING_URL_BODY: &str = r#"{"error": "No URL provided"}"#;
pub const BAD_GATEWAY_BODY: &str = r#"{"error": "Bad Gateway: Failed to contact target URL"}"#;
pub const INTERNAL_ERROR_BODY: &str = r#"{"error": "Internal Server Error"}"#;
pub const METHOD_NOT_ALLOWED_BODY: &str = r#"{"error": "Method Not Allowed"}"#;
pub const PAYLOAD_TOO_LARGE_BODY: &str = r#"{"error": "Payload Too Large"}"#;

/// `{"error": "Bad Request: <message>"}` with the message JSON-escaped.
pub fn bad_request_body(message: &str) -> String {
    let text = serde_json::Value::String(format!("Bad Request: {message}"));
    format!(r#"{{"error": {text}}}"#)
}

fn json_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let content_type = [(CONTENT_TYPE, HeaderValue::from_static("application/json"))];
    (status, content_type, body.into()).into_response()
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        json_response(self.status, self.body)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            RelayError::MissingUrl => (status, Body::from(MISSING_URL_BODY)).into_response(),
            RelayError::BadRequest(message) => json_response(status, bad_request_body(&message)),
            RelayError::MethodNotAllowed(_) => json_response(status, METHOD_NOT_ALLOWED_BODY),
            RelayError::PayloadTooLarge(_) => json_response(status, PAYLOAD_TOO_LARGE_BODY),
            RelayError::Upstream(_) => json_response(status, BAD_GATEWAY_BODY),
            RelayError::Internal(_) => json_response(status, INTERNAL_ERROR_BODY),
        }
    }
}

/// Response for a request whose handler panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(%detail, "Handler panicked");

    json_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
}
