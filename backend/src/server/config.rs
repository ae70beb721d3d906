//! Service settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `AUTH_*` / `BROKER_*` environment variables or
//! a config file. Unset values take the field defaults.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

fn parse_bind_addr(raw: &str) -> io::Result<SocketAddr> {
    raw.parse().map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid bind address {raw:?}: {error}"),
        )
    })
}

fn parse_url(setting: &str, raw: &str) -> io::Result<Url> {
    Url::parse(raw).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid {setting} {raw:?}: {error}"),
        )
    })
}

/// Settings for the credential capability service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUTH")]
pub struct AuthServiceSettings {
    /// Socket address to listen on.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// PostgreSQL URL. Without it the service keeps users in memory.
    pub database_url: Option<String>,
    /// Per-call bound on credential store queries, in seconds.
    #[ortho_config(default = 10)]
    pub query_timeout_secs: u64,
    /// Log capability endpoint receiving audit entries.
    #[ortho_config(default = "http://logger-service/log".to_owned())]
    pub log_url: String,
    /// Per-write bound on audit entries, in milliseconds.
    #[ortho_config(default = 2_000)]
    pub audit_timeout_ms: u64,
    /// Transport timeout for calls to the log capability, in milliseconds.
    #[ortho_config(default = 5_000)]
    pub capability_timeout_ms: u64,
}

impl AuthServiceSettings {
    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the configured value is not a socket address.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        parse_bind_addr(&self.bind_addr)
    }

    /// Parsed log capability URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the configured value is not a URL.
    pub fn log_url(&self) -> io::Result<Url> {
        parse_url("log_url", &self.log_url)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn audit_timeout(&self) -> Duration {
        Duration::from_millis(self.audit_timeout_ms)
    }

    pub fn capability_timeout(&self) -> Duration {
        Duration::from_millis(self.capability_timeout_ms)
    }
}

/// Settings for the broker service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BROKER")]
pub struct BrokerServiceSettings {
    /// Socket address to listen on.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// Credential capability endpoint.
    #[ortho_config(default = "http://auth-service/authenticate".to_owned())]
    pub auth_url: String,
    /// Log capability endpoint.
    #[ortho_config(default = "http://logger-service/log".to_owned())]
    pub log_url: String,
    /// Transport timeout for each routed call, in milliseconds.
    #[ortho_config(default = 5_000)]
    pub capability_timeout_ms: u64,
}

impl BrokerServiceSettings {
    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the configured value is not a socket address.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        parse_bind_addr(&self.bind_addr)
    }

    /// Parsed credential capability URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the configured value is not a URL.
    pub fn auth_url(&self) -> io::Result<Url> {
        parse_url("auth_url", &self.auth_url)
    }

    /// Parsed log capability URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the configured value is not a URL.
    pub fn log_url(&self) -> io::Result<Url> {
        parse_url("log_url", &self.log_url)
    }

    pub fn capability_timeout(&self) -> Duration {
        Duration::from_millis(self.capability_timeout_ms)
    }
}
