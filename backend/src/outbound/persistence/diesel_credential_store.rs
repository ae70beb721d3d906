//! PostgreSQL-backed `CredentialStore` implementation using Diesel ORM.
//!
//! Every call is bounded by the store's query timeout, covering both pool
//! checkout and the statement itself. A call that overruns fails with
//! `CredentialStoreError::Storage`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::password::{hash_password_blocking, verify_password_blocking};
use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{EmailAddress, NewUser, PasswordHash, User, UserId};

use super::models::{
    NewUserRow, PasswordChangeset, SoftDeleteChangeset, UserProfileChangeset, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Default bound on a single store call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Diesel-backed implementation of the `CredentialStore` port.
#[derive(Clone)]
pub struct DieselCredentialStore {
    pool: DbPool,
    query_timeout: Duration,
}

impl DieselCredentialStore {
    /// Create a store over `pool` with the default query timeout.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CredentialStoreError>
    where
        F: Future<Output = Result<T, CredentialStoreError>>,
    {
        bounded(self.query_timeout, operation, fut).await
    }
}

async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, CredentialStoreError>
where
    F: Future<Output = Result<T, CredentialStoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                timeout_ms = limit.as_millis(),
                "credential store call timed out"
            );
            Err(CredentialStoreError::storage(format!(
                "{operation} timed out"
            )))
        }
    }
}

fn map_pool_error(error: PoolError) -> CredentialStoreError {
    CredentialStoreError::storage(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> CredentialStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => CredentialStoreError::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            CredentialStoreError::constraint("email already registered")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CredentialStoreError::storage("database connection error")
        }
        DieselError::QueryBuilderError(_) => CredentialStoreError::storage("database query error"),
        _ => CredentialStoreError::storage("database error"),
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::new(row.id),
        email: EmailAddress::from_stored(row.email),
        password_hash: PasswordHash::from_stored(row.password_hash),
        first_name: row.first_name,
        last_name: row.last_name,
        active: row.active,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    }
}

fn require_touched(rows: usize) -> Result<(), CredentialStoreError> {
    if rows == 0 {
        Err(CredentialStoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for DieselCredentialStore {
    async fn insert(&self, candidate: NewUser) -> Result<UserId, CredentialStoreError> {
        let NewUser {
            email,
            password,
            first_name,
            last_name,
            active,
        } = candidate;
        let password_hash = hash_password_blocking(password).await?;

        self.bounded("insert", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let now = Utc::now();
            let row = NewUserRow {
                email: email.as_str(),
                password_hash: password_hash.as_str(),
                first_name: first_name.as_deref(),
                last_name: last_name.as_deref(),
                active,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(users::table)
                .values(&row)
                .returning(users::id)
                .get_result::<i32>(&mut conn)
                .await
                .map(UserId::new)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<User>, CredentialStoreError> {
        self.bounded("list_all", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<UserRow> = users::table
                .order(users::id.asc())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(row_to_user).collect())
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, CredentialStoreError> {
        self.bounded("find_by_email", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: Option<UserRow> = users::table
                .filter(users::email.eq(email.as_str()))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            row.map(row_to_user).ok_or(CredentialStoreError::NotFound)
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, CredentialStoreError> {
        self.bounded("find_by_id", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: Option<UserRow> = users::table
                .find(id.get())
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            row.map(row_to_user).ok_or(CredentialStoreError::NotFound)
        })
        .await
    }

    async fn update(&self, user: &User) -> Result<(), CredentialStoreError> {
        self.bounded("update", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let changes = UserProfileChangeset {
                email: user.email.as_str(),
                first_name: user.first_name.as_deref(),
                last_name: user.last_name.as_deref(),
                active: user.active,
                updated_at: Utc::now(),
            };
            let rows = diesel::update(users::table.find(user.id.get()))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            require_touched(rows)
        })
        .await
    }

    async fn reset_password(
        &self,
        new_password: &str,
        user: &User,
    ) -> Result<(), CredentialStoreError> {
        let password_hash = hash_password_blocking(Zeroizing::new(new_password.to_owned())).await?;

        self.bounded("reset_password", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let changes = PasswordChangeset {
                password_hash: password_hash.as_str(),
                updated_at: Utc::now(),
            };
            let rows = diesel::update(users::table.find(user.id.get()))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            require_touched(rows)
        })
        .await
    }

    async fn soft_delete(&self, id: UserId) -> Result<(), CredentialStoreError> {
        self.bounded("soft_delete", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let now = Utc::now();
            let changes = SoftDeleteChangeset {
                active: false,
                deleted_at: now,
                updated_at: now,
            };
            let rows = diesel::update(users::table.find(id.get()))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            require_touched(rows)
        })
        .await
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
