//! # Chat Engine
//!
//! Message distribution, reactions and the mention inbox for a real-time
//! chat backend.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Storage backend (in-memory or PostgreSQL)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use chat_engine::config::Settings;
use chat_engine::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration decides the log format, so it loads first
    let settings = Settings::load()?;

    // Initialize tracing subscriber for structured logging
    chat_engine::telemetry::init_tracing(&settings.telemetry);

    info!("Starting Chat Engine...");
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        backend = ?settings.storage.backend,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
