//! Integration tests for `DieselCredentialStore`.
//!
//! Runs the credential store contract against embedded PostgreSQL.

use std::time::Duration;

use authbroker::domain::ports::{CredentialStore, CredentialStoreError};
use authbroker::domain::{EmailAddress, NewUser, PasswordHash, UserId};
use authbroker::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{execute, handle_cluster_setup_failure, provision_users_database};

struct TestContext {
    runtime: Runtime,
    store: DieselCredentialStore,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_users_database()?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        store: DieselCredentialStore::new(pool),
        database_url,
        _database: database,
    })
}

#[fixture]
fn store_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn candidate(email: &str, password: &str) -> NewUser {
    NewUser::new(EmailAddress::new(email).expect("valid email"), password)
        .expect("valid candidate")
        .with_names(Some("Ada".to_owned()), Some("Lovelace".to_owned()))
}

#[rstest]
fn insert_then_fetch_by_email_returns_hash_not_plaintext(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: insert_then_fetch_by_email_returns_hash_not_plaintext skipped");
        return;
    };

    ctx.runtime.block_on(async {
        let id = ctx
            .store
            .insert(candidate("ada@example.com", "first-password"))
            .await
            .expect("insert");
        let email = EmailAddress::new("ada@example.com").expect("valid email");
        let user = ctx.store.find_by_email(&email).await.expect("fetch");

        assert_eq!(user.id, id);
        assert_eq!(user.email, email);
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.last_name.as_deref(), Some("Lovelace"));
        assert!(user.active);
        assert!(user.deleted_at.is_none());
        assert!(user.password_hash.as_str().starts_with("$argon2id$"));
        assert!(ctx.store.verify("first-password", &user).await.expect("verify"));

        let duplicate = ctx
            .store
            .insert(candidate("ada@example.com", "other"))
            .await
            .expect_err("duplicate email");
        assert!(matches!(duplicate, CredentialStoreError::Constraint { .. }));
    });
}

#[rstest]
fn update_rewrites_profile_but_not_hash(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_rewrites_profile_but_not_hash skipped");
        return;
    };

    ctx.runtime.block_on(async {
        let id = ctx
            .store
            .insert(candidate("ada@example.com", "pw"))
            .await
            .expect("insert");
        let mut user = ctx.store.find_by_id(id).await.expect("fetch");
        let stored_hash = user.password_hash.clone();
        user.first_name = Some("Augusta".to_owned());
        user.last_name = None;
        user.password_hash = PasswordHash::from_stored("ignored");

        ctx.store.update(&user).await.expect("update");

        let stored = ctx.store.find_by_id(id).await.expect("fetch");
        assert_eq!(stored.first_name.as_deref(), Some("Augusta"));
        assert_eq!(stored.last_name, None);
        assert_eq!(stored.password_hash, stored_hash);
        assert!(stored.updated_at >= user.updated_at);

        user.id = UserId::new(9_999);
        assert_eq!(
            ctx.store.update(&user).await,
            Err(CredentialStoreError::NotFound)
        );
    });
}

#[rstest]
fn reset_password_swaps_which_password_verifies(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: reset_password_swaps_which_password_verifies skipped");
        return;
    };

    ctx.runtime.block_on(async {
        let id = ctx
            .store
            .insert(candidate("ada@example.com", "old-password"))
            .await
            .expect("insert");
        let user = ctx.store.find_by_id(id).await.expect("fetch");

        ctx.store
            .reset_password("new-password", &user)
            .await
            .expect("reset");

        let reloaded = ctx.store.find_by_id(id).await.expect("fetch");
        assert!(!ctx.store.verify("old-password", &reloaded).await.expect("verify"));
        assert!(ctx.store.verify("new-password", &reloaded).await.expect("verify"));
    });
}

#[rstest]
fn soft_delete_is_idempotent_and_keeps_the_row(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: soft_delete_is_idempotent_and_keeps_the_row skipped");
        return;
    };

    ctx.runtime.block_on(async {
        let id = ctx
            .store
            .insert(candidate("ada@example.com", "pw"))
            .await
            .expect("insert");

        ctx.store.soft_delete(id).await.expect("first delete");
        let first = ctx.store.find_by_id(id).await.expect("still retrievable");
        tokio::time::sleep(Duration::from_millis(5)).await;
        ctx.store.soft_delete(id).await.expect("second delete");
        let second = ctx.store.find_by_id(id).await.expect("still retrievable");

        assert!(!first.active);
        assert!(!second.active);
        let first_deleted = first.deleted_at.expect("deleted_at set");
        let second_deleted = second.deleted_at.expect("deleted_at set");
        assert!(second_deleted > first_deleted);

        assert_eq!(
            ctx.store.soft_delete(UserId::new(9_999)).await,
            Err(CredentialStoreError::NotFound)
        );
    });
}

#[rstest]
fn legacy_rows_load_with_email_as_stored(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: legacy_rows_load_with_email_as_stored skipped");
        return;
    };

    execute(
        &ctx.database_url,
        "INSERT INTO users (email, password_hash) VALUES ('admin', 'x'), ('bob@example.com ', 'y');",
    )
    .expect("seed legacy rows");

    ctx.runtime.block_on(async {
        let users = ctx.store.list_all().await.expect("list");
        let emails: Vec<&str> = users.iter().map(|user| user.email.as_str()).collect();
        assert_eq!(emails, vec!["admin", "bob@example.com "]);
    });
}

#[rstest]
fn overrunning_query_fails_as_storage_error(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: overrunning_query_fails_as_storage_error skipped");
        return;
    };
    let store = ctx.store.clone().with_query_timeout(Duration::from_nanos(1));

    ctx.runtime.block_on(async {
        let result = store.find_by_id(UserId::new(1)).await;
        assert_eq!(
            result,
            Err(CredentialStoreError::storage("find_by_id timed out"))
        );
    });
}
