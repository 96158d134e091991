//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, every path to the relay)
//!     → request.rs (target url, Content-Length, body buffering)
//!     → [relay handler forwards upstream]
//!     → response.rs (status/body translation, error bodies)
//!     → cors.rs (headers on every response)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use server::{build_router, HttpServer};
