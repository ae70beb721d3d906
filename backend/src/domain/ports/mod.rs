//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`CredentialStore`, `AuditSink`, `CapabilityClient`) describe
//! what the domain needs from infrastructure; driving ports (`LoginService`,
//! `ActionDispatcher`) are what inbound adapters call. Each driven port
//! exposes a typed error enum so adapters map their failures into predictable
//! variants.

mod macros;
pub(crate) use macros::define_port_error;

mod action_dispatcher;
mod audit_sink;
mod capability_client;
mod credential_store;
mod login_service;

#[cfg(test)]
pub use action_dispatcher::MockActionDispatcher;
pub use action_dispatcher::ActionDispatcher;
#[cfg(test)]
pub use audit_sink::MockAuditSink;
pub use audit_sink::{AuditSink, AuditSinkError, DiscardAuditSink};
#[cfg(test)]
pub use capability_client::MockCapabilityClient;
pub use capability_client::{
    Capability, CapabilityClient, CapabilityClientError, CapabilityResponse,
};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
