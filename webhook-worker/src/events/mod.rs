//! Webhook event decoding and dispatch.
//!
//! ## Dispatch Flow
//!
//! ```text
//! verified body → WebhookEnvelope → (Ping | Event → AppEvent | Other) → RequestLogger
//! ```

pub mod dispatch;
pub mod types;

pub use dispatch::{dispatch, DispatchError, Disposition};
pub use types::{AppEvent, EventBody, EventType, Installation, WebhookEnvelope, WebhookType};
