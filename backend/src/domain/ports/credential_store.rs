//! Driven port owning user records and the hash/verify contract.
//!
//! Adapters hash plaintext at insert/reset time and verify with the hashing
//! algorithm's own comparison. Soft-deleted records stay retrievable by id and
//! by email; deletion is a status flag, not erasure.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use zeroize::Zeroizing;

use crate::domain::password::{hash_password_blocking, verify_password_blocking};
use crate::domain::{EmailAddress, NewUser, PasswordHashError, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// No record matches the requested identity or email.
        NotFound => "user not found",
        /// A uniqueness constraint (email) was violated.
        Constraint { message: String } => "credential store constraint violated: {message}",
        /// Transport, I/O, or timeout failure talking to storage.
        Storage { message: String } => "credential store unavailable: {message}",
        /// The hashing primitive failed or a stored hash is unreadable.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

impl From<PasswordHashError> for CredentialStoreError {
    fn from(error: PasswordHashError) -> Self {
        Self::hashing(error.to_string())
    }
}

/// Port for durable user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Hash the candidate's password, persist the record, and return its id.
    async fn insert(&self, candidate: NewUser) -> Result<UserId, CredentialStoreError>;

    /// Every record, soft-deleted ones included, ordered by identity.
    async fn list_all(&self) -> Result<Vec<User>, CredentialStoreError>;

    /// Fetch a record by exact email match.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, CredentialStoreError>;

    /// Fetch a record by identity.
    async fn find_by_id(&self, id: UserId) -> Result<User, CredentialStoreError>;

    /// Overwrite email, names, and active flag. Leaves the hash untouched.
    async fn update(&self, user: &User) -> Result<(), CredentialStoreError>;

    /// Replace the stored hash with a fresh hash of `new_password`.
    async fn reset_password(
        &self,
        new_password: &str,
        user: &User,
    ) -> Result<(), CredentialStoreError>;

    /// Mark the record deleted and inactive. Repeating it refreshes the timestamp.
    async fn soft_delete(&self, id: UserId) -> Result<(), CredentialStoreError>;

    /// Check `password` against the user's stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    async fn verify(&self, password: &str, user: &User) -> Result<bool, CredentialStoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    users: BTreeMap<UserId, User>,
}

impl MemoryState {
    fn email_taken(&self, email: &EmailAddress, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| &user.email == email && Some(user.id) != except)
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut User, CredentialStoreError> {
        self.users
            .get_mut(&id)
            .ok_or(CredentialStoreError::NotFound)
    }
}

/// In-memory store for tests and for running without a database.
///
/// Honours the full port contract, including email uniqueness and soft
/// deletion.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    state: Mutex<MemoryState>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, CredentialStoreError> {
        self.state
            .lock()
            .map_err(|_| CredentialStoreError::storage("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, candidate: NewUser) -> Result<UserId, CredentialStoreError> {
        let NewUser {
            email,
            password,
            first_name,
            last_name,
            active,
        } = candidate;
        let password_hash = hash_password_blocking(password).await?;

        let mut state = self.lock()?;
        if state.email_taken(&email, None) {
            return Err(CredentialStoreError::constraint(format!(
                "email {email} already registered"
            )));
        }
        state.last_id += 1;
        let id = UserId::new(state.last_id);
        let now = Utc::now();
        state.users.insert(
            id,
            User {
                id,
                email,
                password_hash,
                first_name,
                last_name,
                active,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<User>, CredentialStoreError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, CredentialStoreError> {
        self.lock()?
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned()
            .ok_or(CredentialStoreError::NotFound)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, CredentialStoreError> {
        self.lock()?
            .users
            .get(&id)
            .cloned()
            .ok_or(CredentialStoreError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<(), CredentialStoreError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&user.id) {
            return Err(CredentialStoreError::NotFound);
        }
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(CredentialStoreError::constraint(format!(
                "email {} already registered",
                user.email
            )));
        }
        let stored = state.user_mut(user.id)?;
        stored.email = user.email.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.active = user.active;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_password(
        &self,
        new_password: &str,
        user: &User,
    ) -> Result<(), CredentialStoreError> {
        let password_hash = hash_password_blocking(Zeroizing::new(new_password.to_owned())).await?;
        let mut state = self.lock()?;
        let stored = state.user_mut(user.id)?;
        stored.password_hash = password_hash;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn soft_delete(&self, id: UserId) -> Result<(), CredentialStoreError> {
        let mut state = self.lock()?;
        let stored = state.user_mut(id)?;
        let now = Utc::now();
        stored.deleted_at = Some(now);
        stored.active = false;
        stored.updated_at = now;
        Ok(())
    }

    async fn verify(&self, password: &str, user: &User) -> Result<bool, CredentialStoreError> {
        verify_password_blocking(
            Zeroizing::new(password.to_owned()),
            user.password_hash.clone(),
        )
        .await
        .map_err(CredentialStoreError::from)
    }
}
