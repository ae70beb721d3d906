//! Credential checking on top of a [`CredentialStore`].
//!
//! Unknown emails and wrong passwords collapse into the same
//! `Unauthorized("invalid credentials")` error. A successful login emits one
//! audit entry through the [`AuditDispatcher`]; the audit outcome never
//! changes the login result.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::ports::{CredentialStore, CredentialStoreError, LoginService};
use super::{AuditDispatcher, Error, LogEntry, LoginCredentials, PublicUser};

/// Action name recorded in the audit log for successful logins.
pub const AUTHENTICATE_AUDIT_NAME: &str = "authenticate";

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// `LoginService` implementation backed by a credential store.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    audit: AuditDispatcher,
}

impl CredentialService {
    /// Create a service over `store` that audits through `audit`.
    pub fn new(store: Arc<dyn CredentialStore>, audit: AuditDispatcher) -> Self {
        Self { store, audit }
    }
}

fn map_store_error(err: CredentialStoreError) -> Error {
    match err {
        CredentialStoreError::NotFound => Error::unauthorized(INVALID_CREDENTIALS),
        CredentialStoreError::Hashing { message } => {
            error!(%message, "stored password hash unreadable");
            Error::internal("password verification failed")
        }
        CredentialStoreError::Storage { message } => {
            error!(%message, "credential store unavailable");
            Error::service_unavailable("credential store unavailable")
        }
        CredentialStoreError::Constraint { message } => {
            error!(%message, "unexpected constraint failure during authentication");
            Error::internal("credential store failure")
        }
    }
}

#[async_trait]
impl LoginService for CredentialService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<PublicUser, Error> {
        let user = self
            .store
            .find_by_email(credentials.email())
            .await
            .map_err(map_store_error)?;

        let matched = self
            .store
            .verify(credentials.password(), &user)
            .await
            .map_err(map_store_error)?;
        if !matched {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = user.id.get(), "user authenticated");
        drop(
            self.audit
                .dispatch(LogEntry::new(AUTHENTICATE_AUDIT_NAME, user.email.as_str())),
        );
        Ok(user.to_public())
    }
}

#[cfg(test)]
mod tests {
    //! Behavioural coverage for credential checking and audit emission.
    use std::time::Duration;

    use super::*;
    use crate::domain::ports::{
        AuditSink, AuditSinkError, InMemoryCredentialStore, MockCredentialStore,
    };
    use crate::domain::{DEFAULT_AUDIT_TIMEOUT, EmailAddress, ErrorCode, NewUser};
    use rstest::rstest;
    use tokio::sync::mpsc;

    struct ChannelSink {
        sender: mpsc::UnboundedSender<LogEntry>,
    }

    #[async_trait]
    impl AuditSink for ChannelSink {
        async fn write(&self, entry: &LogEntry) -> Result<(), AuditSinkError> {
            self.sender
                .send(entry.clone())
                .map_err(|err| AuditSinkError::transport(err.to_string()))
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn write(&self, _entry: &LogEntry) -> Result<(), AuditSinkError> {
            Err(AuditSinkError::rejected(500_u16))
        }
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid test credentials")
    }

    async fn seeded_store() -> Arc<InMemoryCredentialStore> {
        let store = Arc::new(InMemoryCredentialStore::new());
        let email = EmailAddress::new("ada@example.com").expect("valid email");
        let candidate = NewUser::new(email, "correct horse")
            .expect("valid candidate")
            .with_names(Some("Ada".to_owned()), None);
        store.insert(candidate).await.expect("insert succeeds");
        store
    }

    #[tokio::test]
    async fn valid_credentials_return_public_user_and_emit_audit_entry() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let audit = AuditDispatcher::new(Arc::new(ChannelSink { sender }), DEFAULT_AUDIT_TIMEOUT);
        let service = CredentialService::new(seeded_store().await, audit);

        let user = service
            .authenticate(&credentials("ada@example.com", "correct horse"))
            .await
            .expect("credentials should authenticate");

        assert_eq!(user.email.as_str(), "ada@example.com");
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        let entry = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("audit entry arrives")
            .expect("channel open");
        assert_eq!(entry, LogEntry::new("authenticate", "ada@example.com"));
    }

    #[tokio::test]
    async fn failing_audit_sink_does_not_deny_login() {
        let audit = AuditDispatcher::new(Arc::new(FailingSink), DEFAULT_AUDIT_TIMEOUT);
        let service = CredentialService::new(seeded_store().await, audit);

        let outcome = service
            .authenticate(&credentials("ada@example.com", "correct horse"))
            .await;

        assert!(outcome.is_ok());
    }

    #[rstest]
    #[case::unknown_email("nobody@example.com", "correct horse")]
    #[case::wrong_password("ada@example.com", "wrong horse")]
    #[tokio::test]
    async fn rejected_logins_are_indistinguishable(#[case] email: &str, #[case] password: &str) {
        let service = CredentialService::new(seeded_store().await, AuditDispatcher::discarding());

        let err = service
            .authenticate(&credentials(email, password))
            .await
            .expect_err("login must fail");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid credentials");
    }

    #[tokio::test]
    async fn soft_deleted_user_keeps_stored_credentials() {
        let store = seeded_store().await;
        let user = store
            .find_by_email(&EmailAddress::new("ada@example.com").expect("valid email"))
            .await
            .expect("user exists");
        store.soft_delete(user.id).await.expect("soft delete");
        let service = CredentialService::new(store, AuditDispatcher::discarding());

        let public = service
            .authenticate(&credentials("ada@example.com", "correct horse"))
            .await
            .expect("record is retained after soft delete");

        assert!(!public.active);
    }

    #[rstest]
    #[case::hashing(
        CredentialStoreError::hashing("bad phc"),
        ErrorCode::InternalError
    )]
    #[case::storage(
        CredentialStoreError::storage("connection reset"),
        ErrorCode::ServiceUnavailable
    )]
    #[tokio::test]
    async fn verify_failures_are_not_reported_as_bad_credentials(
        #[case] failure: CredentialStoreError,
        #[case] expected: ErrorCode,
    ) {
        let user = {
            let store = seeded_store().await;
            store
                .find_by_email(&EmailAddress::new("ada@example.com").expect("valid email"))
                .await
                .expect("user exists")
        };
        let mut store = MockCredentialStore::new();
        store
            .expect_find_by_email()
            .returning(move |_| Ok(user.clone()));
        store
            .expect_verify()
            .returning(move |_, _| Err(failure.clone()));
        let service = CredentialService::new(Arc::new(store), AuditDispatcher::discarding());

        let err = service
            .authenticate(&credentials("ada@example.com", "correct horse"))
            .await
            .expect_err("store failure must surface");

        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn storage_failure_during_lookup_is_service_unavailable() {
        let mut store = MockCredentialStore::new();
        store
            .expect_find_by_email()
            .returning(|_| Err(CredentialStoreError::storage("timed out")));
        let service = CredentialService::new(Arc::new(store), AuditDispatcher::discarding());

        let err = service
            .authenticate(&credentials("ada@example.com", "x"))
            .await
            .expect_err("lookup failure must surface");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
