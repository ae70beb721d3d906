//! Driven port for calling a named downstream capability.
//!
//! One call is one attempt. Adapters never retry.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ResponseEnvelope;

use super::define_port_error;

/// Downstream capabilities reachable from this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Credential check exposed by the auth service.
    Authenticate,
    /// Append-only write exposed by the log service.
    WriteLog,
}

impl Capability {
    /// Stable name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::WriteLog => "write_log",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded downstream answer with its status code preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityResponse {
    pub status: u16,
    pub body: ResponseEnvelope,
}

define_port_error! {
    /// Transport failures raised by capability clients.
    pub enum CapabilityClientError {
        /// Connection refused, reset, or otherwise not established.
        Connection { message: String } => "capability connection failed: {message}",
        /// The call exceeded its timeout budget.
        Timeout { message: String } => "capability call timed out: {message}",
        /// The response body was not a valid envelope.
        Decode { message: String } => "capability response malformed: {message}",
    }
}

/// Port for issuing one call to a named capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CapabilityClient: Send + Sync {
    /// Serialise `payload`, call `capability` once, and decode its envelope.
    async fn call(
        &self,
        capability: Capability,
        payload: &Value,
    ) -> Result<CapabilityResponse, CapabilityClientError>;
}
