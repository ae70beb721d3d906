//! Action routing for the broker.
//!
//! Each decoded [`Action`] maps onto exactly one [`Capability`]. The router
//! makes one call, keeps the downstream status and envelope, and turns any
//! transport failure into `BadGateway`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::ports::{ActionDispatcher, Capability, CapabilityClient, CapabilityResponse};
use super::{Action, Error};

const DOWNSTREAM_UNAVAILABLE: &str = "downstream service unavailable";

/// `ActionDispatcher` backed by a capability client.
#[derive(Clone)]
pub struct ActionRouter {
    client: Arc<dyn CapabilityClient>,
}

impl ActionRouter {
    /// Create a router issuing calls through `client`.
    pub fn new(client: Arc<dyn CapabilityClient>) -> Self {
        Self { client }
    }
}

fn route(action: Action) -> Result<(Capability, Value), Error> {
    let (capability, payload) = match action {
        Action::Auth(auth) => (Capability::Authenticate, serde_json::to_value(auth)),
        Action::Log(log) => (Capability::WriteLog, serde_json::to_value(log)),
    };
    let payload =
        payload.map_err(|err| Error::internal(format!("failed to encode payload: {err}")))?;
    Ok((capability, payload))
}

#[async_trait]
impl ActionDispatcher for ActionRouter {
    async fn dispatch(&self, action: Action) -> Result<CapabilityResponse, Error> {
        let action_name = action.name();
        let (capability, payload) = route(action)?;
        match self.client.call(capability, &payload).await {
            Ok(response) => {
                debug!(
                    action = action_name,
                    %capability,
                    status = response.status,
                    "capability answered"
                );
                Ok(CapabilityResponse {
                    status: response.status,
                    body: response.body.normalized(),
                })
            }
            Err(err) => {
                warn!(action = action_name, %capability, error = %err, "capability call failed");
                Err(Error::bad_gateway(DOWNSTREAM_UNAVAILABLE))
            }
        }
    }
}
