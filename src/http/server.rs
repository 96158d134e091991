//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router sending every path to the relay handler
//! - Wire up middleware (request ID, tracing, panic catching, CORS)
//! - Bind server to listener and serve until shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → CORS headers → CatchPanic → relay
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::cors::with_cors;
use crate::http::response::panic_response;
use crate::relay::{RelayHandler, ReqwestTransport, Transport};

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server forwarding through a `reqwest` client built from `config`.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(&config.timeouts)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a server forwarding through `transport`.
    pub fn with_transport<T: Transport>(config: RelayConfig, transport: T) -> Self {
        let handler = Arc::new(RelayHandler::new(transport, config.limits.max_body_size));
        let router = build_router(handler);
        Self { router }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Relay listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Relay shutting down");
            })
            .await?;

        tracing::info!("Relay stopped");
        Ok(())
    }

    /// The fully layered router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router<T: Transport>(handler: Arc<RelayHandler<T>>) -> Router {
    let router = Router::new()
        .route("/", any(relay::<T>))
        .route("/{*path}", any(relay::<T>))
        .with_state(handler)
        .layer(CatchPanicLayer::custom(panic_response));

    with_cors(router).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}

async fn relay<T: Transport>(
    State(handler): State<Arc<RelayHandler<T>>>,
    request: Request<Body>,
) -> Response {
    handler.handle(request).await
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
    use crate::http::response::INTERNAL_ERROR_BODY;
    use crate::relay::{OutboundRequest, TransportError, UpstreamResponse};
    use axum::body::Bytes;
    use axum::http::{header::CONTENT_LENGTH, Method, StatusCode};
    use std::future::Future;
    use tower::ServiceExt;

    /// Answers with the target URL so each request can be told apart.
    struct EchoTarget;

    impl Transport for EchoTarget {
        fn send(
            &self,
            request: OutboundRequest,
        ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send {
            async move {
                match request.url.as_str() {
                    "http://down.test/" => Err(TransportError::Connect("refused".into())),
                    "http://panic.test/" => panic!("transport blew up"),
                    other => Ok(UpstreamResponse {
                        status: StatusCode::OK,
                        body: Bytes::from(other.to_string()),
                    }),
                }
            }
        }
    }

    fn router() -> Router {
        HttpServer::with_transport(RelayConfig::default(), EchoTarget).router()
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], ALLOW_ORIGIN);
        assert_eq!(headers["access-control-allow-methods"], ALLOW_METHODS);
        assert_eq!(headers["access-control-allow-headers"], ALLOW_HEADERS);
    }

    #[tokio::test]
    async fn test_cors_on_every_branch() {
        let post_without_length = Request::builder()
            .method(Method::POST)
            .uri("/?url=http://up.test/")
            .body(Body::from("foo=bar"))
            .unwrap();
        let oversized = Request::builder()
            .method(Method::POST)
            .uri("/?url=http://up.test/")
            .header(CONTENT_LENGTH, "99999999")
            .body(Body::empty())
            .unwrap();

        let cases = [
            (request(Method::GET, "/?url=http://up.test/"), StatusCode::OK),
            (request(Method::GET, "/"), StatusCode::BAD_REQUEST),
            (request(Method::GET, "/?url=http://down.test/"), StatusCode::BAD_GATEWAY),
            (request(Method::OPTIONS, "/any/path"), StatusCode::OK),
            (request(Method::PUT, "/?url=http://up.test/"), StatusCode::METHOD_NOT_ALLOWED),
            (post_without_length, StatusCode::INTERNAL_SERVER_ERROR),
            (oversized, StatusCode::PAYLOAD_TOO_LARGE),
            (
                request(Method::GET, "/?url=http://panic.test/"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (req, expected) in cases {
            let response = router().oneshot(req).await.unwrap();
            assert_eq!(response.status(), expected);
            assert_cors(&response);
        }
    }

    #[tokio::test]
    async fn test_any_path_is_relayed() {
        let response = router()
            .oneshot(request(Method::GET, "/some/deep/path?url=http://up.test/x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"http://up.test/x");
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let response = router()
            .oneshot(request(Method::GET, "/?url=http://panic.test/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], INTERNAL_ERROR_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_request_id_is_set_and_propagated() {
        let response = router()
            .oneshot(request(Method::OPTIONS, "/"))
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let supplied = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(supplied).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }
}
