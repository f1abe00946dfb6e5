//! Shared fixtures for integration tests.

#![allow(dead_code)]

use org_directory::models::{account_state, NewBackendGroup};
use org_directory::store::{GroupStore, SqliteStore, Store, StoreBackendConfig};
use sqlx::SqlitePool;

pub const TENANT: u32 = 1;

/// Connected in-memory store with the tenant schema created.
pub async fn setup_test_store() -> SqliteStore {
    org_directory::logging::init();
    let store = SqliteStore::connect(&StoreBackendConfig::memory_sqlite())
        .await
        .unwrap();
    store.init_tenant(TENANT).await.unwrap();
    store
}

/// Insert an account row the way the external account directory would.
/// Accounts are not created through this crate, so fixtures write the
/// collaborator's table directly.
pub async fn insert_account(pool: &SqlitePool, user_id: &str) -> i64 {
    insert_account_with_state(pool, user_id, account_state::ENABLED).await
}

pub async fn insert_account_with_state(pool: &SqlitePool, user_id: &str, state: i64) -> i64 {
    let sql = format!(
        "INSERT INTO t{}_accounts (user_id, display_name, email, backend, state) \
         VALUES (?1, ?2, ?3, 'local', ?4)",
        TENANT
    );
    let display_name = format!("{} Display", user_id);
    let email = format!("{}@example.com", user_id);
    sqlx::query(&sql)
        .bind(user_id)
        .bind(&display_name)
        .bind(&email)
        .bind(state)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

/// Insert a group via the store and return its assigned primary key.
pub async fn insert_group(store: &SqliteStore, gid: &str, display_name: &str) -> i64 {
    store
        .insert_group(TENANT, &NewBackendGroup::new(gid, display_name, "local"))
        .await
        .unwrap()
        .id
}

/// Count relation rows for a group, both roles.
pub async fn count_membership_rows(pool: &SqlitePool, group_pk: i64) -> i64 {
    let sql = format!(
        "SELECT COUNT(*) FROM t{}_memberships WHERE backend_group_id = ?1",
        TENANT
    );
    let count: (i64,) = sqlx::query_as(&sql)
        .bind(group_pk)
        .fetch_one(pool)
        .await
        .unwrap();
    count.0
}
