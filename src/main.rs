//! CORS relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                   RELAY                       │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐   │
//!   ───────────────────┼─▶│  http   │──▶│  relay   │──▶│ transport │───┼──▶ ?url= target
//!                      │  │ server  │   │ handler  │   │ (reqwest) │   │
//!                      │  └─────────┘   └──────────┘   └─────┬─────┘   │
//!                      │                                     │         │
//!   Client Response    │  ┌─────────┐   ┌──────────┐         │         │
//!   ◀──────────────────┼──│  CORS   │◀──│ response │◀────────┘         │
//!                      │  │ layers  │   │ mapping  │                   │
//!                      │  └─────────┘   └──────────┘                   │
//!                      │                                               │
//!                      │  config · observability · lifecycle           │
//!                      └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::Cli;
use cors_relay::lifecycle::{wait_for_shutdown, Shutdown};
use cors_relay::observability::logging;
use cors_relay::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().resolve()?;

    logging::init(&config.observability);

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        connect_timeout_secs = config.timeouts.connect_secs,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.listener.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
