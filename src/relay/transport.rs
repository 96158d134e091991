//! Outbound side of the relay.
//!
//! # Responsibilities
//! - Model the request-scoped entities (target, method, outbound request, upstream response)
//! - Issue the outbound GET/POST with the fixed form content type
//! - Bound every outbound call with connect and total deadlines
//! - Classify client failures into `TransportError`

use std::fmt;
use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};

use crate::config::TimeoutConfig;
use crate::relay::error::{RelayError, TransportError};

/// Content type sent on every outbound request, whatever the caller sent.
pub const FORWARD_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Target extracted from the `url` query parameter.
///
/// Guaranteed non-empty. Scheme and host are not checked here; the
/// outbound client rejects what it cannot send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// Wrap a raw value, rejecting the empty string.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Methods the relay forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMethod {
    Get,
    Post,
}

impl TryFrom<&Method> for RelayMethod {
    type Error = RelayError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match method {
            &Method::GET => Ok(RelayMethod::Get),
            &Method::POST => Ok(RelayMethod::Post),
            other => Err(RelayError::BadRequest(format!(
                "Unsupported method: {other}"
            ))),
        }
    }
}

impl fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayMethod::Get => f.write_str("GET"),
            RelayMethod::Post => f.write_str("POST"),
        }
    }
}

/// Request issued to the upstream target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: RelayMethod,
    pub url: TargetUrl,
    /// Present for POST only.
    pub body: Option<Bytes>,
}

/// What the upstream answered. Headers are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Sends one outbound request and collects the full response.
///
/// The returned future must be `Send` so handlers can run on any worker.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport with connect and total deadlines.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honouring the configured timeouts.
    ///
    /// Environment proxy settings are ignored.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send {
        let builder = match request.method {
            RelayMethod::Get => self.client.get(request.url.as_str()),
            RelayMethod::Post => self.client.post(request.url.as_str()),
        }
        .header(CONTENT_TYPE, FORWARD_CONTENT_TYPE);

        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };

        async move {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok(UpstreamResponse { status, body })
        }
    }
}
