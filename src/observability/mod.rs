//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and middleware events
//!     → tracing spans (one per request, carrying x-request-id)
//!     → logging.rs (subscriber: env filter + human or JSON output)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Logs are informational only; nothing depends on them
//! - `RUST_LOG` wins over the configured level

pub mod logging;
