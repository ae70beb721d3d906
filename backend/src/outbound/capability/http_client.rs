//! Reqwest-backed capability client.
//!
//! Owns transport details only: JSON request encoding, trace header
//! propagation, timeout and connection error mapping, and envelope decoding.
//! The downstream status code is returned untouched.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{Capability, CapabilityClient, CapabilityClientError, CapabilityResponse};
use crate::domain::{ResponseEnvelope, TRACE_ID_HEADER, TraceId};

/// Default bound on one capability call.
pub const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoint URL for each reachable capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityEndpoints {
    urls: HashMap<Capability, Url>,
}

impl CapabilityEndpoints {
    /// Empty endpoint table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url` as the endpoint for `capability`.
    #[must_use]
    pub fn with(mut self, capability: Capability, url: Url) -> Self {
        self.urls.insert(capability, url);
        self
    }

    /// Endpoint for `capability`, if configured.
    pub fn get(&self, capability: Capability) -> Option<&Url> {
        self.urls.get(&capability)
    }
}

/// Capability client issuing one JSON POST per call.
pub struct HttpCapabilityClient {
    client: Client,
    endpoints: CapabilityEndpoints,
}

impl HttpCapabilityClient {
    /// Build a client whose every call is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: CapabilityEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl CapabilityClient for HttpCapabilityClient {
    async fn call(
        &self,
        capability: Capability,
        payload: &Value,
    ) -> Result<CapabilityResponse, CapabilityClientError> {
        let endpoint = self.endpoints.get(capability).ok_or_else(|| {
            CapabilityClientError::connection(format!("no endpoint configured for {capability}"))
        })?;

        let mut request = self
            .client
            .post(endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload);
        if let Some(trace_id) = TraceId::current() {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(%capability, status = status.as_u16(), bytes = body.len(), "capability responded");

        let envelope = decode_envelope(status, body.as_ref())?;
        Ok(CapabilityResponse {
            status: status.as_u16(),
            body: envelope,
        })
    }
}

fn decode_envelope(status: StatusCode, body: &[u8]) -> Result<ResponseEnvelope, CapabilityClientError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        let message = status.canonical_reason().unwrap_or_default();
        return Ok(if status.is_success() {
            ResponseEnvelope::success(message, None)
        } else {
            ResponseEnvelope::failure(message)
        });
    }
    serde_json::from_slice::<ResponseEnvelope>(body).map_err(|error| {
        CapabilityClientError::decode(format!(
            "status {}: invalid envelope: {error}",
            status.as_u16()
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> CapabilityClientError {
    if error.is_timeout() {
        CapabilityClientError::timeout(error.to_string())
    } else if error.is_decode() || error.is_body() {
        CapabilityClientError::decode(error.to_string())
    } else {
        CapabilityClientError::connection(error.to_string())
    }
}
