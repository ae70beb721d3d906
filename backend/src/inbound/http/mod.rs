//! HTTP inbound adapter for the credential capability and the broker.

pub mod authenticate;
pub mod broker;
pub mod error;
pub mod health;
pub mod state;

pub use error::ApiResult;
