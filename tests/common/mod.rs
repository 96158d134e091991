//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use cors_relay::{HttpServer, RelayConfig, Shutdown};

/// A relay running on an ephemeral local port.
#[allow(dead_code)]
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningRelay {
    /// Relay URL forwarding to `target`, with the target form-encoded.
    pub fn url_for(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        format!("http://{}/?url={}", self.addr, encoded)
    }
}

/// Start a relay with `config`, overriding the listener to 127.0.0.1:0.
pub async fn start_relay(mut config: RelayConfig) -> RunningRelay {
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;

    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningRelay {
        addr,
        shutdown,
        task,
    }
}

/// Start a mock upstream with a handful of fixed behaviours.
///
/// - `/ok`          → 200 `{"a":1}`
/// - `/missing`     → 404 `nope`
/// - `/binary`      → 200 non-UTF-8 bytes
/// - `/slow`        → 200 after three seconds
/// - `/id/{n}`      → 200 `n`
/// - `/echo`        → JSON description of what arrived
pub async fn start_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { r#"{"a":1}"# }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
        .route("/binary", get(|| async { Bytes::from_static(BINARY_BODY) }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        )
        .route("/id/{n}", get(|Path(n): Path<u32>| async move { n.to_string() }))
        .route("/echo", any(echo));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

#[allow(dead_code)]
pub const BINARY_BODY: &[u8] = &[0x00, 0x9f, 0x92, 0x96, 0xff, b'\n'];

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    Json(json!({
        "method": method.as_str(),
        "content_type": header(CONTENT_TYPE.as_str()),
        "api_key": header("x-api-key"),
        "body": String::from_utf8_lossy(&body),
    }))
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Write `request` verbatim to `addr` and read until the server closes.
///
/// For messages a well-behaved client would refuse to produce.
#[allow(dead_code)]
pub async fn send_raw(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("server did not close the connection")
        .unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Assert the three CORS headers carry their exact values.
pub fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET,POST,OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "x-api-key,Content-Type");
}
