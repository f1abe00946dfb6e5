use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

/// Initialize tenant-specific database schema for SQLite
///
/// Creates the accounts, groups, and memberships tables for a tenant with
/// the indexes and constraints the stores rely on. The accounts table
/// follows the collaborating account directory's schema; this core only
/// reads it but creates it here so the membership foreign keys have a
/// target in self-contained deployments.
pub async fn init_tenant_schema(pool: &SqlitePool, tenant_id: u32) -> AppResult<()> {
    let accounts_table = format!("t{}_accounts", tenant_id);
    let groups_table = format!("t{}_backend_groups", tenant_id);
    let memberships_table = format!("t{}_memberships", tenant_id);

    let accounts_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            display_name TEXT,
            email TEXT,
            last_login INTEGER NOT NULL DEFAULT 0,
            backend TEXT NOT NULL,
            state INTEGER NOT NULL DEFAULT 0,
            quota TEXT,
            home TEXT
        )
        "#,
        accounts_table
    );

    sqlx::query(&accounts_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create accounts table: {}", e)))?;

    let groups_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            group_id TEXT NOT NULL,
            display_name TEXT NOT NULL,
            backend TEXT NOT NULL
        )
        "#,
        groups_table
    );

    sqlx::query(&groups_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create groups table: {}", e)))?;

    // At most one relation row per (group, account, role) triple; racing
    // inserts are serialized by this constraint rather than by any
    // application-level locking.
    let memberships_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            backend_group_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            membership_type INTEGER NOT NULL CHECK (membership_type IN (0, 1)),
            UNIQUE(backend_group_id, account_id, membership_type),
            FOREIGN KEY (backend_group_id) REFERENCES {} (id),
            FOREIGN KEY (account_id) REFERENCES {} (id)
        )
        "#,
        memberships_table, groups_table, accounts_table
    );

    sqlx::query(&memberships_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create memberships table: {}", e)))?;

    create_indexes(pool, tenant_id).await?;

    Ok(())
}

/// Create indexes for tenant tables.
///
/// The group_id uniqueness lives in a named index, not an inline column
/// constraint, so corrupted-state scenarios can be reproduced in tests by
/// dropping the index.
async fn create_indexes(pool: &SqlitePool, tenant_id: u32) -> AppResult<()> {
    let accounts_table = format!("t{}_accounts", tenant_id);
    let groups_table = format!("t{}_backend_groups", tenant_id);
    let memberships_table = format!("t{}_memberships", tenant_id);

    let indexes = vec![
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{}_groups_group_id ON {} (group_id)",
            tenant_id, groups_table
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_groups_display_name ON {} (LOWER(display_name))",
            tenant_id, groups_table
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_accounts_user_id ON {} (user_id)",
            tenant_id, accounts_table
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_memberships_group ON {} (backend_group_id)",
            tenant_id, memberships_table
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_memberships_account ON {} (account_id)",
            tenant_id, memberships_table
        ),
    ];

    for sql in &indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}

/// Drop tenant-specific schema (for cleanup/testing)
#[allow(dead_code)]
pub async fn drop_tenant_schema(pool: &SqlitePool, tenant_id: u32) -> AppResult<()> {
    let memberships_table = format!("t{}_memberships", tenant_id);
    let groups_table = format!("t{}_backend_groups", tenant_id);
    let accounts_table = format!("t{}_accounts", tenant_id);

    // Drop in reverse order due to foreign key constraints
    for table in [&memberships_table, &groups_table, &accounts_table] {
        let sql = format!("DROP TABLE IF EXISTS {}", table);
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to drop table {}: {}", table, e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_schema_creation() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let tenant_id = 1u32;

        init_tenant_schema(&pool, tenant_id).await.unwrap();

        // Idempotent
        init_tenant_schema(&pool, tenant_id).await.unwrap();

        let count: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM t{}_memberships",
            tenant_id
        ))
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count.0, 0);

        drop_tenant_schema(&pool, tenant_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_membership_unique_constraint_present() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_tenant_schema(&pool, 1).await.unwrap();

        sqlx::query("INSERT INTO t1_accounts (user_id, backend) VALUES ('u1', 'local')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO t1_backend_groups (group_id, display_name, backend) VALUES ('g1', 'G1', 'local')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO t1_memberships (backend_group_id, account_id, membership_type) VALUES (1, 1, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let duplicate = sqlx::query(
            "INSERT INTO t1_memberships (backend_group_id, account_id, membership_type) VALUES (1, 1, 0)",
        )
        .execute(&pool)
        .await;
        assert!(duplicate.is_err());

        // Same pair, other role is a distinct row
        sqlx::query(
            "INSERT INTO t1_memberships (backend_group_id, account_id, membership_type) VALUES (1, 1, 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
    }
}
