//! Webhook endpoint handlers.
//!
//! The webhook handler:
//! 1. Rejects anything but POST
//! 2. Verifies the Ed25519 signature
//! 3. Dispatches the body into log records
//! 4. Hands the records to the sink in the background and returns
//!
//! Response bodies are always empty; the status code is the whole answer.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::events::{dispatch, Disposition};
use crate::logging::{LogRecord, LogSink, RequestLogger};
use crate::web::context::ExecutionContext;
use crate::web::signature::{Authenticator, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub authenticator: Arc<Authenticator>,
    /// Remote sink; `None` keeps records in tracing only
    pub sink: Option<Arc<dyn LogSink>>,
    pub context: ExecutionContext,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Authenticator,
        sink: Option<Arc<dyn LogSink>>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            config: Arc::new(config),
            authenticator: Arc::new(authenticator),
            sink,
            context,
        }
    }

    /// Register shipping of `records` with the execution context.
    ///
    /// Failures are logged and otherwise ignored.
    fn ship_deferred(&self, records: Vec<LogRecord>) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        if records.is_empty() {
            return;
        }

        self.context.wait_until(async move {
            let record_count = records.len();
            if let Err(e) = sink.ship(records).await {
                warn!(error = %e, record_count = record_count, "log_ship_failed");
            }
        });
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Application Webhook
// =============================================================================

/// Read a header as a string, treating absent or non-UTF-8 values as empty.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Answer every non-POST request on the webhook route.
///
/// Registered as the method fallback so the request body is never read.
pub async fn method_not_allowed(method: Method) -> StatusCode {
    warn!(method = %method, "webhook_method_not_allowed");
    StatusCode::METHOD_NOT_ALLOWED
}

/// Application webhook endpoint (POST only).
///
/// Every authentication failure answers 401 with no indication of which
/// check failed.
pub async fn application_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = header_str(&headers, SIGNATURE_HEADER);
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);

    info!(
        has_signature = !signature.is_empty(),
        has_timestamp = !timestamp.is_empty(),
        body_length = body.len(),
        "webhook_received"
    );

    if !state.authenticator.is_authentic(signature, timestamp, &body) {
        return StatusCode::UNAUTHORIZED;
    }

    let mut logger = RequestLogger::new();
    let outcome = dispatch(&body, &mut logger);
    state.ship_deferred(logger.take());

    match outcome {
        Ok(Disposition::Acknowledged) => {
            info!("webhook_handled");
            StatusCode::NO_CONTENT
        }
        Ok(Disposition::Rejected) => {
            warn!("webhook_rejected_unexpected_type");
            StatusCode::FORBIDDEN
        }
        Err(e) => {
            error!(error = %e, body_length = body.len(), "webhook_body_malformed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
