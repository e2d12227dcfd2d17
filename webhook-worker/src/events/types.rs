//! Discord application webhook payload types.
//!
//! Every discriminator in this module is open: values the platform adds later
//! deserialize into a catch-all variant carrying the raw value instead of
//! failing.
//! Reference: https://discord.com/developers/docs/events/webhook-events

use serde::Deserialize;
use serde_json::Value;

/// Top-level webhook envelope.
///
/// `event` is kept as raw JSON until the envelope type is known, so a ping or
/// an unexpected envelope never fails on an event body it does not use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookEnvelope {
    /// Webhook payload version
    #[serde(default)]
    pub version: Option<Value>,
    /// Application the webhook was sent for
    #[serde(default)]
    pub application_id: Option<Value>,
    /// Envelope type
    #[serde(rename = "type", default)]
    pub kind: WebhookType,
    /// Event record, present on `Event` envelopes
    #[serde(default)]
    pub event: Option<Value>,
}

/// Envelope discriminator (`0` = ping, `1` = event).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum WebhookType {
    Ping,
    Event,
    /// Anything else, including a missing `type`
    Other(Value),
}

impl Default for WebhookType {
    fn default() -> Self {
        WebhookType::Other(Value::Null)
    }
}

/// Read a non-negative integral number, accepting `0.0`-style floats.
fn integral(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

impl From<Value> for WebhookType {
    fn from(value: Value) -> Self {
        match integral(&value) {
            Some(0) => WebhookType::Ping,
            Some(1) => WebhookType::Event,
            _ => WebhookType::Other(value),
        }
    }
}

/// Body of an `Event` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventBody {
    /// Event subtype
    #[serde(rename = "type", default)]
    pub kind: EventType,
    /// ISO 8601 time the event was emitted
    #[serde(default)]
    pub timestamp: Option<Value>,
    /// Subtype-specific payload
    #[serde(default)]
    pub data: Option<Value>,
}

/// Event subtype discriminator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum EventType {
    ApplicationAuthorized,
    ApplicationDeauthorized,
    EntitlementCreate,
    EntitlementUpdate,
    EntitlementDelete,
    QuestUserEnrollment,
    /// Unrecognized, missing or non-string subtype
    Unknown(Value),
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Unknown(Value::Null)
    }
}

impl From<Value> for EventType {
    fn from(raw: Value) -> Self {
        match raw.as_str().unwrap_or_default() {
            "APPLICATION_AUTHORIZED" => EventType::ApplicationAuthorized,
            "APPLICATION_DEAUTHORIZED" => EventType::ApplicationDeauthorized,
            "ENTITLEMENT_CREATE" => EventType::EntitlementCreate,
            "ENTITLEMENT_UPDATE" => EventType::EntitlementUpdate,
            "ENTITLEMENT_DELETE" => EventType::EntitlementDelete,
            "QUEST_USER_ENROLLMENT" => EventType::QuestUserEnrollment,
            _ => EventType::Unknown(raw),
        }
    }
}

impl EventType {
    /// Wire name of the subtype; `None` when the raw value is not a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventType::ApplicationAuthorized => Some("APPLICATION_AUTHORIZED"),
            EventType::ApplicationDeauthorized => Some("APPLICATION_DEAUTHORIZED"),
            EventType::EntitlementCreate => Some("ENTITLEMENT_CREATE"),
            EventType::EntitlementUpdate => Some("ENTITLEMENT_UPDATE"),
            EventType::EntitlementDelete => Some("ENTITLEMENT_DELETE"),
            EventType::QuestUserEnrollment => Some("QUEST_USER_ENROLLMENT"),
            EventType::Unknown(raw) => raw.as_str(),
        }
    }
}

/// Where an application was installed (`data.integration_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    Guild,
    User,
    /// Missing or unrecognized integration type
    Unspecified,
}

impl Installation {
    fn from_data(data: Option<&Value>) -> Self {
        match data
            .and_then(|d| d.get("integration_type"))
            .and_then(integral)
        {
            Some(0) => Installation::Guild,
            Some(1) => Installation::User,
            _ => Installation::Unspecified,
        }
    }
}

/// An event with its subtype-specific discriminators resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    ApplicationAuthorized(Installation),
    ApplicationDeauthorized,
    EntitlementCreate,
    EntitlementUpdate,
    EntitlementDelete,
    QuestUserEnrollment,
    Unknown(Value),
}

impl EventBody {
    pub fn classify(&self) -> AppEvent {
        match &self.kind {
            EventType::ApplicationAuthorized => {
                AppEvent::ApplicationAuthorized(Installation::from_data(self.data.as_ref()))
            }
            EventType::ApplicationDeauthorized => AppEvent::ApplicationDeauthorized,
            EventType::EntitlementCreate => AppEvent::EntitlementCreate,
            EventType::EntitlementUpdate => AppEvent::EntitlementUpdate,
            EventType::EntitlementDelete => AppEvent::EntitlementDelete,
            EventType::QuestUserEnrollment => AppEvent::QuestUserEnrollment,
            EventType::Unknown(raw) => AppEvent::Unknown(raw.clone()),
        }
    }
}
