//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing infrastructure, so HTTP handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, PublicUser};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user without its hash.
    ///
    /// Unknown emails and wrong passwords fail identically.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<PublicUser, Error>;
}
