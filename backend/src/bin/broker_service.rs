//! Broker service entry-point: routes action envelopes to capabilities.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use actix_web::web;
use authbroker::inbound::http::health::HealthState;
use authbroker::server::{BrokerServerConfig, BrokerServiceSettings, create_broker_server};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = BrokerServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let config = BrokerServerConfig::from_settings(&settings)?;

    let health_state = web::Data::new(HealthState::new());
    let bound = create_broker_server(health_state, config)?;
    bound.server.await
}
