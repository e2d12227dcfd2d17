//! Log record types and the per-request buffer that collects them.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

/// Severity of a sink record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One `(level, message, context)` record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Unix time in milliseconds when the record was created
    pub dt: u64,
    pub level: LogLevel,
    pub message: String,
    /// Structured context, usually the webhook payload
    pub context: Value,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>, context: Value) -> Self {
        let dt = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            dt,
            level,
            message: message.into(),
            context,
        }
    }
}

/// Serializes as a flat JSON object: object contexts have their keys merged
/// next to `dt`/`level`/`message`, anything else is nested under `context`.
impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("dt", &self.dt)?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("message", &self.message)?;

        match &self.context {
            Value::Object(fields) => {
                for (key, value) in fields {
                    if matches!(key.as_str(), "dt" | "level" | "message") {
                        continue;
                    }
                    map.serialize_entry(key, value)?;
                }
            }
            Value::Null => {}
            other => map.serialize_entry("context", other)?,
        }

        map.end()
    }
}

/// Collects the records produced while handling a single request.
#[derive(Debug, Default)]
pub struct RequestLogger {
    records: Vec<LogRecord>,
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: &str, context: Value) {
        self.log(LogLevel::Info, message, context);
    }

    pub fn warn(&mut self, message: &str, context: Value) {
        self.log(LogLevel::Warn, message, context);
    }

    pub fn error(&mut self, message: &str, context: Value) {
        self.log(LogLevel::Error, message, context);
    }

    /// Record at `level` and mirror the record into `tracing`.
    pub fn log(&mut self, level: LogLevel, message: &str, context: Value) {
        match level {
            LogLevel::Info => info!(log_message = message, context = %context, "webhook_log_record"),
            LogLevel::Warn => warn!(log_message = message, context = %context, "webhook_log_record"),
            LogLevel::Error => error!(log_message = message, context = %context, "webhook_log_record"),
        }

        self.records.push(LogRecord::new(level, message, context));
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Take the buffered records, leaving the logger empty.
    pub fn take(&mut self) -> Vec<LogRecord> {
        std::mem::take(&mut self.records)
    }
}
