//! Server construction for the credential capability and the broker.
//!
//! Each service gets an app builder (usable with `actix_web::test`), a config
//! object holding its already-built adapters, and a `create_*_server`
//! function that binds the listener and marks the service ready.

mod config;

pub use config::{AuthServiceSettings, BrokerServiceSettings};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use crate::Trace;
use crate::domain::ports::{
    Capability, CapabilityClient, CredentialStore, InMemoryCredentialStore,
};
use crate::domain::{ActionRouter, AuditDispatcher, CredentialService};
use crate::inbound::http::authenticate::authenticate;
use crate::inbound::http::broker::{handle_submission, ping};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::{AuthHttpState, BrokerHttpState};
use crate::outbound::capability::{CapabilityAuditSink, CapabilityEndpoints, HttpCapabilityClient};
use crate::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};

/// A started server plus the address it actually bound.
pub struct BoundServer {
    pub server: Server,
    pub local_addr: SocketAddr,
}

/// Adapters behind the credential capability.
pub struct AuthServerConfig {
    pub bind_addr: SocketAddr,
    pub store: Arc<dyn CredentialStore>,
    pub audit: AuditDispatcher,
}

/// Adapters behind the broker.
pub struct BrokerServerConfig {
    pub bind_addr: SocketAddr,
    pub client: Arc<dyn CapabilityClient>,
}

fn build_http_client(
    endpoints: CapabilityEndpoints,
    timeout: Duration,
) -> io::Result<HttpCapabilityClient> {
    HttpCapabilityClient::new(endpoints, timeout)
        .map_err(|error| io::Error::other(format!("build capability client: {error}")))
}

impl AuthServerConfig {
    /// Build the auth service adapters from settings.
    ///
    /// Uses PostgreSQL when `database_url` is set, otherwise an in-memory
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings or when the pool cannot be built.
    pub async fn from_settings(settings: &AuthServiceSettings) -> io::Result<Self> {
        let bind_addr = settings.bind_addr()?;
        let store: Arc<dyn CredentialStore> = match settings.database_url.as_deref() {
            Some(url) => {
                let pool = DbPool::new(PoolConfig::new(url))
                    .await
                    .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
                Arc::new(
                    DieselCredentialStore::new(pool).with_query_timeout(settings.query_timeout()),
                )
            }
            None => {
                warn!("no database_url configured; users are kept in memory");
                Arc::new(InMemoryCredentialStore::new())
            }
        };

        let endpoints = CapabilityEndpoints::new().with(Capability::WriteLog, settings.log_url()?);
        let log_client = build_http_client(endpoints, settings.capability_timeout())?;
        let audit = AuditDispatcher::new(
            Arc::new(CapabilityAuditSink::new(Arc::new(log_client))),
            settings.audit_timeout(),
        );

        Ok(Self {
            bind_addr,
            store,
            audit,
        })
    }
}

impl BrokerServerConfig {
    /// Build the broker adapters from settings.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings or when the HTTP client cannot be
    /// built.
    pub fn from_settings(settings: &BrokerServiceSettings) -> io::Result<Self> {
        let endpoints = CapabilityEndpoints::new()
            .with(Capability::Authenticate, settings.auth_url()?)
            .with(Capability::WriteLog, settings.log_url()?);
        let client = build_http_client(endpoints, settings.capability_timeout())?;
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            client: Arc::new(client),
        })
    }
}

/// App for the credential capability.
pub fn build_auth_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<AuthHttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(authenticate)
        .service(ready)
        .service(live)
}

/// App for the broker.
pub fn build_broker_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<BrokerHttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ping)
        .service(handle_submission)
        .service(ready)
        .service(live)
}

fn bound_addr(addrs: &[SocketAddr], requested: SocketAddr) -> SocketAddr {
    addrs.first().copied().unwrap_or(requested)
}

/// Bind and start the credential capability server.
///
/// The returned [`Server`] must be awaited to drive the listener.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_auth_server(
    health_state: web::Data<HealthState>,
    config: AuthServerConfig,
) -> io::Result<BoundServer> {
    let AuthServerConfig {
        bind_addr,
        store,
        audit,
    } = config;
    let login = Arc::new(CredentialService::new(store, audit));
    let http_state = web::Data::new(AuthHttpState::new(login));
    let server_health_state = health_state.clone();

    let http_server = HttpServer::new(move || {
        build_auth_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?;
    let local_addr = bound_addr(&http_server.addrs(), bind_addr);
    let server = http_server.run();

    health_state.mark_ready();
    info!(%local_addr, "auth service listening");
    Ok(BoundServer { server, local_addr })
}

/// Bind and start the broker server.
///
/// The returned [`Server`] must be awaited to drive the listener.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_broker_server(
    health_state: web::Data<HealthState>,
    config: BrokerServerConfig,
) -> io::Result<BoundServer> {
    let BrokerServerConfig { bind_addr, client } = config;
    let dispatcher = Arc::new(ActionRouter::new(client));
    let http_state = web::Data::new(BrokerHttpState::new(dispatcher));
    let server_health_state = health_state.clone();

    let http_server = HttpServer::new(move || {
        build_broker_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?;
    let local_addr = bound_addr(&http_server.addrs(), bind_addr);
    let server = http_server.run();

    health_state.mark_ready();
    info!(%local_addr, "broker service listening");
    Ok(BoundServer { server, local_addr })
}
