//! Classification of verified webhook bodies into log records.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::types::{AppEvent, EventBody, Installation, WebhookEnvelope, WebhookType};
use crate::logging::RequestLogger;

pub const PING: &str = "Ping.";
pub const UNEXPECTED_WEBHOOK_TYPE: &str = "Unexpected application webhook type.";
pub const GUILD_JOINED: &str = "Guild joined.";
pub const USER_INSTALLED: &str = "User installed application.";
pub const USER_DEAUTHORISED: &str = "User deauthorised application.";
pub const ENTITLEMENT_CREATED: &str = "Entitlement created.";
pub const ENTITLEMENT_UPDATED: &str = "Entitlement updated.";
pub const ENTITLEMENT_DELETED: &str = "Entitlement deleted.";
pub const QUEST_USER_ENROLLMENT: &str = "Quest user enrollment.";
pub const UNEXPECTED_EVENT_TYPE: &str = "Received unexpected application webhook event type.";

/// A verified body that does not satisfy the webhook contract.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("body is not a JSON object")]
    NotAnObject,

    #[error("envelope is malformed: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("event envelope has no event record")]
    MissingEvent,

    #[error("event record is malformed: {0}")]
    MalformedEvent(#[source] serde_json::Error),
}

/// How the HTTP layer should answer a dispatched body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Handled; answer with no content
    Acknowledged,
    /// Verified but not a webhook type this service accepts
    Rejected,
}

/// Decode a verified body and record what it describes in `logger`.
pub fn dispatch(body: &[u8], logger: &mut RequestLogger) -> Result<Disposition, DispatchError> {
    let payload: Value = serde_json::from_slice(body).map_err(DispatchError::InvalidJson)?;
    if !payload.is_object() {
        return Err(DispatchError::NotAnObject);
    }

    let envelope =
        WebhookEnvelope::deserialize(&payload).map_err(DispatchError::MalformedEnvelope)?;

    info!(
        version = ?envelope.version,
        application_id = ?envelope.application_id,
        webhook_type = ?envelope.kind,
        "webhook_dispatching"
    );

    match envelope.kind {
        WebhookType::Ping => {
            logger.info(PING, payload);
            Ok(Disposition::Acknowledged)
        }
        WebhookType::Event => {
            let event = envelope.event.ok_or(DispatchError::MissingEvent)?;
            let body = EventBody::deserialize(&event).map_err(DispatchError::MalformedEvent)?;
            log_event(&body, event, logger);
            Ok(Disposition::Acknowledged)
        }
        WebhookType::Other(_) => {
            logger.error(UNEXPECTED_WEBHOOK_TYPE, payload);
            Ok(Disposition::Rejected)
        }
    }
}

/// Emit the record for one event. `event` is the raw record used as context.
fn log_event(body: &EventBody, event: Value, logger: &mut RequestLogger) {
    let context = json!({ "event": event, "timestamp": body.timestamp });

    match body.classify() {
        AppEvent::ApplicationAuthorized(Installation::Guild) => logger.info(GUILD_JOINED, context),
        AppEvent::ApplicationAuthorized(Installation::User) => {
            logger.info(USER_INSTALLED, context)
        }
        AppEvent::ApplicationAuthorized(Installation::Unspecified) => {
            debug!(event_type = ?body.kind, "application_authorized_without_integration_type");
        }
        AppEvent::ApplicationDeauthorized => logger.info(USER_DEAUTHORISED, context),
        AppEvent::EntitlementCreate => logger.info(ENTITLEMENT_CREATED, context),
        AppEvent::EntitlementUpdate => logger.info(ENTITLEMENT_UPDATED, context),
        AppEvent::EntitlementDelete => logger.info(ENTITLEMENT_DELETED, context),
        AppEvent::QuestUserEnrollment => logger.info(QUEST_USER_ENROLLMENT, context),
        AppEvent::Unknown(_) => logger.warn(UNEXPECTED_EVENT_TYPE, context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    fn event_body(kind: &str, data: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "version": 1,
            "application_id": "1234560123453231555",
            "type": 1,
            "event": {
                "type": kind,
                "timestamp": "2024-10-18T14:42:53.064834",
                "data": data
            }
        }))
        .unwrap()
    }

    fn run(body: &[u8]) -> (Disposition, RequestLogger) {
        let mut logger = RequestLogger::new();
        let disposition = dispatch(body, &mut logger).unwrap();
        (disposition, logger)
    }

    #[test]
    fn test_dispatch_ping() {
        let body = br#"{"version":1,"application_id":"1234560123453231555","type":0}"#;
        let (disposition, logger) = run(body);

        assert_eq!(disposition, Disposition::Acknowledged);
        assert_eq!(logger.records().len(), 1);
        let record = &logger.records()[0];
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.message, PING);
        assert_eq!(record.context["application_id"], "1234560123453231555");
    }

    #[test]
    fn test_dispatch_guild_install() {
        let (disposition, logger) = run(&event_body(
            "APPLICATION_AUTHORIZED",
            json!({"integration_type": 0, "scopes": ["applications.commands"]}),
        ));

        assert_eq!(disposition, Disposition::Acknowledged);
        assert_eq!(logger.records().len(), 1);
        let record = &logger.records()[0];
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.message, GUILD_JOINED);
        assert_eq!(record.context["timestamp"], "2024-10-18T14:42:53.064834");
        assert_eq!(record.context["event"]["data"]["integration_type"], 0);
    }

    #[test]
    fn test_dispatch_user_install() {
        let (_, logger) = run(&event_body("APPLICATION_AUTHORIZED", json!({"integration_type": 1})));

        assert_eq!(logger.records().len(), 1);
        assert_eq!(logger.records()[0].message, USER_INSTALLED);
    }

    #[test]
    fn test_dispatch_authorized_without_integration_type() {
        let (disposition, logger) = run(&event_body("APPLICATION_AUTHORIZED", json!({})));

        assert_eq!(disposition, Disposition::Acknowledged);
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_dispatch_known_subtypes() {
        let cases = [
            ("APPLICATION_DEAUTHORIZED", USER_DEAUTHORISED),
            ("ENTITLEMENT_CREATE", ENTITLEMENT_CREATED),
            ("ENTITLEMENT_UPDATE", ENTITLEMENT_UPDATED),
            ("ENTITLEMENT_DELETE", ENTITLEMENT_DELETED),
            ("QUEST_USER_ENROLLMENT", QUEST_USER_ENROLLMENT),
        ];

        for (kind, message) in cases {
            let (disposition, logger) = run(&event_body(kind, json!({"user": {"id": "1"}})));

            assert_eq!(disposition, Disposition::Acknowledged, "{kind}");
            assert_eq!(logger.records().len(), 1, "{kind}");
            assert_eq!(logger.records()[0].level, LogLevel::Info, "{kind}");
            assert_eq!(logger.records()[0].message, message, "{kind}");
            assert_eq!(logger.records()[0].context["event"]["type"], kind);
        }
    }

    #[test]
    fn test_dispatch_unknown_subtype_warns() {
        let (disposition, logger) = run(&event_body("LOBBY_MESSAGE_CREATE", json!({})));

        assert_eq!(disposition, Disposition::Acknowledged);
        assert_eq!(logger.records().len(), 1);
        assert_eq!(logger.records()[0].level, LogLevel::Warn);
        assert_eq!(logger.records()[0].message, UNEXPECTED_EVENT_TYPE);
    }

    #[test]
    fn test_dispatch_missing_or_non_string_subtype_warns() {
        let bodies: [&[u8]; 3] = [
            br#"{"type":1,"event":{"timestamp":"t","data":{}}}"#,
            br#"{"type":1,"event":{"type":42,"timestamp":"t","data":{}}}"#,
            br#"{"type":1,"event":{"type":null}}"#,
        ];
        for body in bodies {
            let (disposition, logger) = run(body);

            assert_eq!(disposition, Disposition::Acknowledged);
            assert_eq!(logger.records().len(), 1);
            assert_eq!(logger.records()[0].level, LogLevel::Warn);
            assert_eq!(logger.records()[0].message, UNEXPECTED_EVENT_TYPE);
        }
    }

    #[test]
    fn test_dispatch_float_envelope_type() {
        let (disposition, logger) = run(br#"{"type":0.0}"#);

        assert_eq!(disposition, Disposition::Acknowledged);
        assert_eq!(logger.records()[0].message, PING);
    }

    #[test]
    fn test_dispatch_event_without_data() {
        let body = br#"{"type":1,"event":{"type":"ENTITLEMENT_DELETE","timestamp":"t"}}"#;
        let (_, logger) = run(body);

        assert_eq!(logger.records()[0].message, ENTITLEMENT_DELETED);
        assert_eq!(logger.records()[0].context["timestamp"], "t");
    }

    #[test]
    fn test_dispatch_unexpected_envelope_type() {
        let bodies: [&[u8]; 3] = [br#"{"type":2}"#, br#"{"type":"ping"}"#, br#"{"version":1}"#];
        for body in bodies {
            let (disposition, logger) = run(body);

            assert_eq!(disposition, Disposition::Rejected);
            assert_eq!(logger.records().len(), 1);
            assert_eq!(logger.records()[0].level, LogLevel::Error);
            assert_eq!(logger.records()[0].message, UNEXPECTED_WEBHOOK_TYPE);
        }
    }

    #[test]
    fn test_dispatch_is_repeatable() {
        let body = event_body("ENTITLEMENT_CREATE", json!({}));
        let (first, first_logger) = run(&body);
        let (second, second_logger) = run(&body);

        assert_eq!(first, second);
        assert_eq!(first_logger.records().len(), second_logger.records().len());
        assert_eq!(first_logger.records()[0].context, second_logger.records()[0].context);
    }

    #[test]
    fn test_dispatch_malformed_bodies() {
        let mut logger = RequestLogger::new();

        assert!(matches!(
            dispatch(b"{not json", &mut logger),
            Err(DispatchError::InvalidJson(_))
        ));
        assert!(matches!(dispatch(b"[1,2]", &mut logger), Err(DispatchError::NotAnObject)));
        assert!(matches!(
            dispatch(br#"{"type":1}"#, &mut logger),
            Err(DispatchError::MissingEvent)
        ));
        assert!(matches!(
            dispatch(br#"{"type":1,"event":5}"#, &mut logger),
            Err(DispatchError::MalformedEvent(_))
        ));
        assert!(logger.records().is_empty());
    }
}
