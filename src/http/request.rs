//! Inbound request parsing.
//!
//! # Responsibilities
//! - Extract the target from the `url` query parameter
//! - Read the declared Content-Length of a POST
//! - Buffer exactly that many body bytes, once, before forwarding
//!
//! # Design Decisions
//! - Query decoding follows form rules (`+` is a space, percent escapes decoded)
//! - The first non-empty `url` wins; blank values count as absent
//! - Length is checked against the limit before any body byte is read

use axum::body::{Body, Bytes};
use axum::http::{header::CONTENT_LENGTH, HeaderMap, Uri};

use crate::relay::{RelayError, TargetUrl};

/// Name of the query parameter carrying the target.
pub const TARGET_PARAM: &str = "url";

/// Pull the target URL out of the request URI's query string.
pub fn extract_target_url(uri: &Uri) -> Result<TargetUrl, RelayError> {
    let query = uri.query().ok_or(RelayError::MissingUrl)?;

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == TARGET_PARAM)
        .find_map(|(_, value)| TargetUrl::new(value.into_owned()))
        .ok_or(RelayError::MissingUrl)
}

/// Declared body length. Missing or unparsable is an internal fault.
pub fn content_length(headers: &HeaderMap) -> Result<u64, RelayError> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| RelayError::Internal("missing Content-Length header".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| RelayError::Internal(format!("malformed Content-Length: {value:?}")))
}

/// Read the full POST body, bounded by `max_body_size`.
pub async fn read_body(
    headers: &HeaderMap,
    body: Body,
    max_body_size: usize,
) -> Result<Bytes, RelayError> {
    let length = content_length(headers)?;
    if length > max_body_size as u64 {
        return Err(RelayError::PayloadTooLarge(length));
    }

    axum::body::to_bytes(body, length as usize)
        .await
        .map_err(|e| RelayError::Internal(format!("failed to read request body: {e}")))
}
