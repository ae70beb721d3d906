//! Driven port for the external audit log.

use async_trait::async_trait;

use crate::domain::LogEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit sink adapters.
    pub enum AuditSinkError {
        /// The sink answered with a non-success status.
        Rejected { status: u16 } => "audit sink rejected entry with status {status}",
        /// The sink could not be reached.
        Transport { message: String } => "audit sink unreachable: {message}",
    }
}

/// Append-only sink for audit entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Write one entry. Callers treat failures as non-fatal.
    async fn write(&self, entry: &LogEntry) -> Result<(), AuditSinkError>;
}

/// Sink that drops every entry. Used when no log capability is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardAuditSink;

#[async_trait]
impl AuditSink for DiscardAuditSink {
    async fn write(&self, _entry: &LogEntry) -> Result<(), AuditSinkError> {
        Ok(())
    }
}
