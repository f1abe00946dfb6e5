//! SQLite implementation of the store traits.
//!
//! Tables are namespaced per tenant (`t{tenant}_backend_groups`,
//! `t{tenant}_memberships`, `t{tenant}_accounts`); every query formats the
//! table name in and binds values positionally.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::models::{Account, BackendGroup};
use crate::store::{Store, StoreBackendConfig};

pub mod schema;

mod account_directory_impl;
mod group_store_impl;
mod membership_store_impl;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. Tests use this with a single-connection
    /// in-memory pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn table_name(&self, resource: &str, tenant_id: u32) -> String {
        format!("t{}_{}", tenant_id, resource)
    }

    pub(crate) fn groups_table(&self, tenant_id: u32) -> String {
        self.table_name("backend_groups", tenant_id)
    }

    pub(crate) fn memberships_table(&self, tenant_id: u32) -> String {
        self.table_name("memberships", tenant_id)
    }

    pub(crate) fn accounts_table(&self, tenant_id: u32) -> String {
        self.table_name("accounts", tenant_id)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn connect(config: &StoreBackendConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let url = if config.connection_url == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            config.connection_url.clone()
        };

        // Foreign keys are off by default in SQLite; the membership
        // relation relies on them for referential integrity.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| AppError::Database(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        // A pooled in-memory database would give every connection its own
        // empty database, so cap the pool at one connection there.
        let max_connections = if config.is_memory_database() {
            1
        } else {
            config.max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self { pool })
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn init_tenant(&self, tenant_id: u32) -> AppResult<()> {
        schema::init_tenant_schema(&self.pool, tenant_id).await
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Whether the error reports a rejected duplicate (UNIQUE constraint).
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    let error_str = error.to_string();
    error_str.contains("UNIQUE constraint") || error_str.contains("duplicate key")
}

/// Whether the error reports a broken reference (FOREIGN KEY constraint).
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error.to_string().contains("FOREIGN KEY constraint")
}

pub(crate) fn group_from_row(row: &SqliteRow) -> BackendGroup {
    BackendGroup {
        id: row.get("id"),
        group_id: row.get("group_id"),
        display_name: row.get("display_name"),
        backend: row.get("backend"),
    }
}

pub(crate) fn account_from_row(row: &SqliteRow) -> Account {
    Account {
        id: row.get("id"),
        user_id: row.get("user_id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        last_login: row.get("last_login"),
        backend: row.get("backend"),
        state: row.get("state"),
        quota: row.get("quota"),
        home: row.get("home"),
    }
}

/// Column list for account selects; keep in sync with `account_from_row`.
pub(crate) const ACCOUNT_COLUMNS: &str =
    "a.id, a.user_id, a.display_name, a.email, a.last_login, a.backend, a.state, a.quota, a.home";
