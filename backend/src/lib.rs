//! Credential verification and action brokering.
//!
//! The crate hosts two services built from the same hexagon:
//! - the auth service exposes the credential capability backed by a
//!   [`domain::ports::CredentialStore`];
//! - the broker service routes tagged action envelopes to downstream
//!   capabilities through a [`domain::ports::CapabilityClient`].

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use domain::TraceId;
pub use middleware::Trace;
