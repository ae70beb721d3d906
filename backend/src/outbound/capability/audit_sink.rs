//! `AuditSink` adapter that writes entries through the log capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::LogEntry;
use crate::domain::ports::{AuditSink, AuditSinkError, Capability, CapabilityClient};

/// Sends each audit entry to [`Capability::WriteLog`].
#[derive(Clone)]
pub struct CapabilityAuditSink {
    client: Arc<dyn CapabilityClient>,
}

impl CapabilityAuditSink {
    pub fn new(client: Arc<dyn CapabilityClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuditSink for CapabilityAuditSink {
    async fn write(&self, entry: &LogEntry) -> Result<(), AuditSinkError> {
        let payload = serde_json::to_value(entry)
            .map_err(|err| AuditSinkError::transport(format!("encode entry: {err}")))?;
        let response = self
            .client
            .call(Capability::WriteLog, &payload)
            .await
            .map_err(|err| AuditSinkError::transport(err.to_string()))?;
        if (200..300).contains(&response.status) && !response.body.error {
            Ok(())
        } else {
            Err(AuditSinkError::rejected(response.status))
        }
    }
}
