//! Fire-and-forget audit dispatch.
//!
//! Audit writes run on a detached task with their own timeout. Nothing the
//! sink does can fail or delay the operation that produced the entry; failures
//! are logged at `warn` and dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::TraceId;
use super::ports::{AuditSink, DiscardAuditSink};

/// Default budget for one audit write.
pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Entry accepted by the log capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub name: String,
    pub data: String,
}

impl LogEntry {
    /// Build an entry from an action name and its subject.
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Detaches audit writes from the request path.
#[derive(Clone)]
pub struct AuditDispatcher {
    sink: Arc<dyn AuditSink>,
    timeout: Duration,
}

impl AuditDispatcher {
    /// Dispatcher writing to `sink` with a per-write `timeout`.
    pub fn new(sink: Arc<dyn AuditSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Dispatcher that drops every entry.
    pub fn discarding() -> Self {
        Self::new(Arc::new(DiscardAuditSink), DEFAULT_AUDIT_TIMEOUT)
    }

    /// Spawn the write and return immediately.
    ///
    /// The handle exists for tests; production callers drop it.
    pub fn dispatch(&self, entry: LogEntry) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        let timeout = self.timeout;
        let task = async move {
            match tokio::time::timeout(timeout, sink.write(&entry)).await {
                Ok(Ok(())) => debug!(entry = %entry.name, "audit entry written"),
                Ok(Err(error)) => warn!(entry = %entry.name, %error, "audit write failed"),
                Err(_) => warn!(
                    entry = %entry.name,
                    timeout_ms = timeout.as_millis(),
                    "audit write timed out"
                ),
            }
        };
        match TraceId::current() {
            Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, task)),
            None => tokio::spawn(task),
        }
    }
}
