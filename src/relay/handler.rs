//! The relay handler.
//!
//! One inbound request in, exactly one response out:
//!
//! ```text
//! OPTIONS        → 200, empty body
//! GET | POST     → extract url → read body (POST) → send → relay status + body
//! anything else  → 405
//! ```
//!
//! CORS headers are attached by the router layers, not here.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::request::{extract_target_url, read_body};
use crate::relay::error::RelayError;
use crate::relay::transport::{OutboundRequest, RelayMethod, Transport, UpstreamResponse};

/// Stateless request handler, built once per server and shared by all requests.
#[derive(Debug)]
pub struct RelayHandler<T> {
    transport: T,
    max_body_size: usize,
}

impl<T: Transport> RelayHandler<T> {
    pub fn new(transport: T, max_body_size: usize) -> Self {
        Self {
            transport,
            max_body_size,
        }
    }

    /// Dispatch on the inbound method.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let mut guard = DisconnectGuard::new();

        let method = request.method().clone();
        let response = match method {
            Method::OPTIONS => self.handle_options(),
            Method::GET | Method::POST => self.handle_forward(&method, request).await,
            other => {
                let error = RelayError::MethodNotAllowed(other);
                error.log();
                error.into_response()
            }
        };

        guard.disarm();
        response
    }

    /// Preflight: 200, no body.
    pub fn handle_options(&self) -> Response {
        StatusCode::OK.into_response()
    }

    /// Forward the request with `method` and translate the outcome.
    pub async fn handle_forward(&self, method: &Method, request: Request<Body>) -> Response {
        match self.forward(method, request).await {
            Ok(upstream) => upstream.into_response(),
            Err(error) => {
                error.log();
                error.into_response()
            }
        }
    }

    async fn forward(
        &self,
        method: &Method,
        request: Request<Body>,
    ) -> Result<UpstreamResponse, RelayError> {
        let url = extract_target_url(request.uri())?;
        let method = RelayMethod::try_from(method)?;

        let body = match method {
            RelayMethod::Post => {
                let (parts, body) = request.into_parts();
                Some(read_body(&parts.headers, body, self.max_body_size).await?)
            }
            RelayMethod::Get => None,
        };

        tracing::info!(%method, target_url = %url, "Forwarding request");

        let outbound = OutboundRequest {
            method,
            url: url.clone(),
            body,
        };
        let upstream = self.transport.send(outbound).await?;

        tracing::info!(
            target_url = %url,
            status = upstream.status.as_u16(),
            bytes = upstream.body.len(),
            "Response from target"
        );

        Ok(upstream)
    }
}

/// Logs when a request future is dropped before producing its response,
/// which is how a client disconnect surfaces to the handler.
struct DisconnectGuard {
    armed: bool,
}

impl DisconnectGuard {
    fn new() -> Self {
        Self { armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    /// Unwinding out of a panic is not a disconnect; the panic is logged
    /// where it is caught.
    fn should_warn(&self) -> bool {
        self.armed && !std::thread::panicking()
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self.should_warn() {
            tracing::warn!("Premature disconnect from client");
        }
    }
}
