//! Structured log records and the sinks that receive them.
//!
//! Dispatch code writes records into a per-request [`RequestLogger`]. Each
//! record is mirrored into `tracing` straight away; the buffered batch is
//! shipped to the remote [`LogSink`] after the response has been computed.
//!
//! ```text
//! dispatch → RequestLogger ─┬→ tracing (immediate)
//!                           └→ LogSink::ship (deferred, fire-and-forget)
//! ```

pub mod better_stack;
pub mod record;

#[cfg(test)]
pub mod memory;

use futures::future::BoxFuture;
use thiserror::Error;

pub use better_stack::BetterStackSink;
pub use record::{LogLevel, LogRecord, RequestLogger};

/// Errors returned by a sink when a batch could not be delivered.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialize log batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("log transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("log sink rejected batch with status {status}")]
    Rejected { status: u16 },
}

/// A destination for `(level, message, context)` records.
///
/// Delivery semantics (batching, transport, auth) belong to the sink. The
/// returned future is `'static` so it can outlive the request that produced
/// the batch.
pub trait LogSink: Send + Sync {
    fn ship(&self, records: Vec<LogRecord>) -> BoxFuture<'static, Result<(), SinkError>>;
}
