use async_trait::async_trait;

use super::{
    account_from_row, is_foreign_key_violation, is_unique_violation, SqliteStore, ACCOUNT_COLUMNS,
};
use crate::error::{AppError, AppResult};
use crate::models::{Account, MembershipType};
use crate::store::MembershipStore;

/// Positional placeholders for a `membership_type IN (…)` clause,
/// starting at bind index `start`.
fn type_placeholders(start: usize, count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", start + i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl MembershipStore for SqliteStore {
    async fn add_member(
        &self,
        tenant_id: u32,
        group_pk: i64,
        account_pk: i64,
        membership_type: MembershipType,
    ) -> AppResult<bool> {
        let table_name = self.memberships_table(tenant_id);
        let sql = format!(
            "INSERT INTO {} (backend_group_id, account_id, membership_type) VALUES (?1, ?2, ?3)",
            table_name
        );

        let result = sqlx::query(&sql)
            .bind(group_pk)
            .bind(account_pk)
            .bind(membership_type.as_i64())
            .execute(self.pool())
            .await;

        match result {
            Ok(_) => Ok(true),
            // The triple already exists; the row count is unchanged and the
            // caller learns the grant was not new. This is the expected
            // outcome of two racing identical grants.
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::ConstraintViolation(format!(
                "Membership references a nonexistent group or account \
                 (group {}, account {})",
                group_pk, account_pk
            ))),
            Err(e) => Err(AppError::Database(format!(
                "Failed to insert membership: {}",
                e
            ))),
        }
    }

    async fn remove_member(&self, tenant_id: u32, group_pk: i64, account_pk: i64) -> AppResult<()> {
        let table_name = self.memberships_table(tenant_id);
        // Only the GROUP_USER row; an admin row for the same pair survives
        let sql = format!(
            "DELETE FROM {} WHERE backend_group_id = ?1 AND account_id = ?2 AND membership_type = ?3",
            table_name
        );

        sqlx::query(&sql)
            .bind(group_pk)
            .bind(account_pk)
            .bind(MembershipType::GroupUser.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to remove member: {}", e)))?;

        Ok(())
    }

    async fn remove_all_members_of_group(&self, tenant_id: u32, group_pk: i64) -> AppResult<()> {
        let table_name = self.memberships_table(tenant_id);
        let placeholders = type_placeholders(2, MembershipType::ALL.len());
        let sql = format!(
            "DELETE FROM {} WHERE backend_group_id = ?1 AND membership_type IN ({})",
            table_name, placeholders
        );

        let mut query = sqlx::query(&sql).bind(group_pk);
        for membership_type in MembershipType::ALL {
            query = query.bind(membership_type.as_i64());
        }

        query
            .execute(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to remove group members: {}", e)))?;

        Ok(())
    }

    async fn is_member(
        &self,
        tenant_id: u32,
        group_pk: i64,
        account_pk: i64,
        membership_type: MembershipType,
    ) -> AppResult<bool> {
        let table_name = self.memberships_table(tenant_id);
        // Existence probe, not a count
        let sql = format!(
            "SELECT 1 FROM {} WHERE backend_group_id = ?1 AND account_id = ?2 AND membership_type = ?3 LIMIT 1",
            table_name
        );

        let row = sqlx::query(&sql)
            .bind(group_pk)
            .bind(account_pk)
            .bind(membership_type.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check membership: {}", e)))?;

        Ok(row.is_some())
    }

    async fn list_members_of_group(
        &self,
        tenant_id: u32,
        group_pk: i64,
        membership_types: &[MembershipType],
    ) -> AppResult<Vec<Account>> {
        if membership_types.is_empty() {
            return Ok(Vec::new());
        }

        let memberships_table = self.memberships_table(tenant_id);
        let accounts_table = self.accounts_table(tenant_id);
        let placeholders = type_placeholders(2, membership_types.len());

        // DISTINCT over the account columns: an account holding several of
        // the requested roles appears once. Row order is storage-determined.
        let sql = format!(
            r#"
            SELECT DISTINCT {}
            FROM {} m
            INNER JOIN {} a ON a.id = m.account_id
            WHERE m.backend_group_id = ?1 AND m.membership_type IN ({})
            "#,
            ACCOUNT_COLUMNS, memberships_table, accounts_table, placeholders
        );

        let mut query = sqlx::query(&sql).bind(group_pk);
        for membership_type in membership_types {
            query = query.bind(membership_type.as_i64());
        }

        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch group members: {}", e)))?;

        Ok(rows.iter().map(account_from_row).collect())
    }

    async fn list_members_by_group_id(
        &self,
        tenant_id: u32,
        gid: &str,
        membership_types: &[MembershipType],
    ) -> AppResult<Vec<Account>> {
        if membership_types.is_empty() {
            return Ok(Vec::new());
        }

        let memberships_table = self.memberships_table(tenant_id);
        let accounts_table = self.accounts_table(tenant_id);
        let groups_table = self.groups_table(tenant_id);
        let placeholders = type_placeholders(2, membership_types.len());

        let sql = format!(
            r#"
            SELECT DISTINCT {}
            FROM {} m
            INNER JOIN {} a ON a.id = m.account_id
            INNER JOIN {} g ON g.id = m.backend_group_id
            WHERE g.group_id = ?1 AND m.membership_type IN ({})
            "#,
            ACCOUNT_COLUMNS, memberships_table, accounts_table, groups_table, placeholders
        );

        let mut query = sqlx::query(&sql).bind(gid);
        for membership_type in membership_types {
            query = query.bind(membership_type.as_i64());
        }

        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch group members: {}", e)))?;

        Ok(rows.iter().map(account_from_row).collect())
    }
}
