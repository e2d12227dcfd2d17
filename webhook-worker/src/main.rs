//! AppWebhook Web Server - Discord application webhook receiver.
//!
//! This binary:
//! - Verifies signed webhook events from Discord
//! - Logs each event type to Better Stack (or tracing only, when unconfigured)
//! - Answers with an empty body in microseconds
//!
//! Log shipments still in flight at shutdown are drained before exit.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use appwebhook::{router, AppState, Authenticator, BetterStackSink, Config, ExecutionContext, LogSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        better_stack_configured = config.better_stack_token.is_some(),
        better_stack_url = %config.better_stack_url,
        "config_loaded"
    );

    let authenticator =
        Authenticator::from_hex(&config.public_key).context("PUBLIC_KEY is not a valid Ed25519 key")?;

    let sink: Option<Arc<dyn LogSink>> = match &config.better_stack_token {
        Some(token) => {
            let client = Client::builder()
                .build()
                .context("Failed to create HTTP client")?;
            Some(Arc::new(BetterStackSink::new(
                client,
                config.better_stack_url.clone(),
                token.clone(),
                Duration::from_millis(config.log_ship_timeout_ms),
            )))
        }
        None => {
            warn!("better_stack_not_configured");
            None
        }
    };

    let context = ExecutionContext::new();
    let drain_timeout = Duration::from_millis(config.shutdown_drain_timeout_ms);
    let port = config.port;

    // Create application state and router
    let state = AppState::new(config, authenticator, sink, context.clone());
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let deferred log shipments finish
    info!(pending = context.pending(), "log_shipments_draining");
    if tokio::time::timeout(drain_timeout, context.drain()).await.is_err() {
        warn!(
            pending = context.pending(),
            timeout_ms = drain_timeout.as_millis() as u64,
            "log_shipments_drain_timeout"
        );
    }

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
