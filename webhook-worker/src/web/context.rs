//! Deferred work that must finish before the server shuts down.
//!
//! Handlers register follow-up work (log shipping) with
//! [`ExecutionContext::wait_until`] and return their response immediately.
//! At shutdown the server calls [`ExecutionContext::drain`] so no registered
//! task is dropped mid-flight.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Tracks deferred tasks spawned on behalf of requests.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    inner: Arc<ContextInner>,
}

#[derive(Default)]
struct ContextInner {
    pending: AtomicUsize,
    idle: Notify,
}

/// Decrements the pending count even if the task panics.
struct PendingGuard(Arc<ContextInner>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.0.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` in the background; `drain` will not return before it completes.
    pub fn wait_until<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        let guard = PendingGuard(Arc::clone(&self.inner));

        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    /// Number of registered tasks that have not completed.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Wait until every registered task has completed.
    pub async fn drain(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }

            notified.await;
        }
    }
}
