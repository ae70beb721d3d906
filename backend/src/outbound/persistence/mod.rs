//! PostgreSQL persistence for credential records.
//!
//! `DieselCredentialStore` implements the domain `CredentialStore` port on
//! `diesel-async` with `bb8` pooling. Row structs (`models.rs`) and the table
//! definition (`schema.rs`) stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use authbroker::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/auth")).await?;
//! let store = DieselCredentialStore::new(pool);
//! ```

mod diesel_credential_store;
mod models;
mod pool;
mod schema;

pub use diesel_credential_store::{DEFAULT_QUERY_TIMEOUT, DieselCredentialStore};
pub use pool::{DbPool, PoolConfig, PoolError};
