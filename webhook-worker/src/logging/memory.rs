//! In-memory sink for tests.

use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};

use super::{LogRecord, LogSink, SinkError};

/// Keeps every shipped batch; optionally fails each shipment.
#[derive(Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Vec<LogRecord>>>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<LogRecord>> {
        self.batches.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn ship(&self, records: Vec<LogRecord>) -> BoxFuture<'static, Result<(), SinkError>> {
        self.batches.lock().unwrap().push(records);
        let result = if self.fail {
            Err(SinkError::Rejected { status: 503 })
        } else {
            Ok(())
        };
        future::ready(result).boxed()
    }
}
