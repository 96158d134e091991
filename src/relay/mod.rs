//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → handler.rs (dispatch on method, extract target, read body)
//!     → transport.rs (issue outbound GET/POST with bounded wait)
//!     → error.rs (typed failure: client / upstream / internal)
//!     → http::response (translate to status + body, CORS added by layers)
//! ```
//!
//! # Design Decisions
//! - Every request is an independent pipeline; nothing is shared but config
//! - Inbound headers are never forwarded
//! - A failed upstream call fails the inbound request immediately (no retries)
//! - The transport is a trait so the error table is testable without a network

pub mod error;
pub mod handler;
pub mod transport;

pub use error::{RelayError, TransportError};
pub use handler::RelayHandler;
pub use transport::{
    OutboundRequest, RelayMethod, ReqwestTransport, TargetUrl, Transport, UpstreamResponse,
    FORWARD_CONTENT_TYPE,
};
