//! Better Stack (Logtail) HTTP ingestion sink.
//!
//! Batches are sent as a JSON array to the source's ingest endpoint,
//! authenticated with the source token as a bearer credential.
//! Reference: https://betterstack.com/docs/logs/http-rest-api/

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client};
use tracing::info;
use url::Url;

use super::{LogRecord, LogSink, SinkError};

/// Ships log batches to Better Stack.
#[derive(Clone)]
pub struct BetterStackSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    client: Client,
    url: Url,
    token: String,
    timeout: Duration,
}

impl BetterStackSink {
    /// Create a sink sharing `client` for all shipments.
    pub fn new(client: Client, url: Url, token: String, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                client,
                url,
                token,
                timeout,
            }),
        }
    }
}

impl SinkInner {
    async fn send(&self, records: Vec<LogRecord>) -> Result<(), SinkError> {
        let body = serde_json::to_vec(&records)?;
        let body_length = body.len();

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(
            record_count = records.len(),
            body_length = body_length,
            status_code = status.as_u16(),
            "better_stack_batch_shipped"
        );

        Ok(())
    }
}

impl LogSink for BetterStackSink {
    fn ship(&self, records: Vec<LogRecord>) -> BoxFuture<'static, Result<(), SinkError>> {
        let inner = Arc::clone(&self.inner);
        async move { inner.send(records).await }.boxed()
    }
}
