//! CORS relay library.
//!
//! Accepts GET/POST requests carrying a target in `?url=`, forwards method
//! and body to that target, and relays the upstream status and body back
//! with permissive cross-origin headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
