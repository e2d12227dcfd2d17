//! AppWebhook - Discord application webhook event receiver.
//!
//! This library provides the modules behind the `appwebhook-web` binary:
//! - `web`: signature verification, handlers and the router
//! - `events`: envelope decoding and event classification
//! - `logging`: log records and the Better Stack sink
//!
//! ## Architecture
//!
//! ```text
//! Discord → POST / → Authenticator → dispatch → RequestLogger → Better Stack
//! ```

pub mod config;
pub mod events;
pub mod logging;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use events::{dispatch, Disposition};
pub use logging::{BetterStackSink, LogSink};
pub use web::{router, AppState, Authenticator, ExecutionContext};
