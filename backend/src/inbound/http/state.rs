//! Shared HTTP adapter state.
//!
//! Handlers receive these bundles via `actix_web::web::Data`, so they depend
//! only on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ActionDispatcher, LoginService};

/// Dependencies of the credential capability handlers.
#[derive(Clone)]
pub struct AuthHttpState {
    pub login: Arc<dyn LoginService>,
}

impl AuthHttpState {
    pub fn new(login: Arc<dyn LoginService>) -> Self {
        Self { login }
    }
}

/// Dependencies of the broker handlers.
#[derive(Clone)]
pub struct BrokerHttpState {
    pub dispatcher: Arc<dyn ActionDispatcher>,
}

impl BrokerHttpState {
    pub fn new(dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self { dispatcher }
    }
}
