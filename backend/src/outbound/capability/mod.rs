//! Downstream capability adapters.
//!
//! `HttpCapabilityClient` makes exactly one HTTP call per invocation;
//! `CapabilityAuditSink` routes audit entries to the log capability through
//! any `CapabilityClient`.

mod audit_sink;
mod http_client;

pub use audit_sink::CapabilityAuditSink;
pub use http_client::{CapabilityEndpoints, DEFAULT_CAPABILITY_TIMEOUT, HttpCapabilityClient};
