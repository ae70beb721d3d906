//! Driving port for the broker's action routing use-case.

use async_trait::async_trait;

use crate::domain::{Action, Error};

use super::CapabilityResponse;

/// Route one decoded action to its downstream capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    /// Dispatch `action` and return the downstream answer unchanged.
    ///
    /// Transport failures become [`crate::domain::ErrorCode::BadGateway`].
    async fn dispatch(&self, action: Action) -> Result<CapabilityResponse, Error>;
}
