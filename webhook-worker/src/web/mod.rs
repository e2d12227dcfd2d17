//! Web server module for receiving application webhooks.
//!
//! This module provides a thin web server that:
//! - Receives signed webhook events on `/`
//! - Verifies the Ed25519 request signature
//! - Dispatches the event into structured log records
//! - Responds with an empty body and ships logs in the background

pub mod context;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use context::ExecutionContext;
pub use handlers::{application_webhook, health, method_not_allowed, AppState, HealthResponse};
pub use signature::{Authenticator, SignatureError, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Build the service router.
///
/// Non-POST requests on the webhook route fall back to 405 before any body
/// is read.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(application_webhook).fallback(method_not_allowed))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
