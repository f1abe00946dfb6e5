use async_trait::async_trait;

use super::{account_from_row, SqliteStore, ACCOUNT_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::models::Account;
use crate::store::AccountDirectory;

#[async_trait]
impl AccountDirectory for SqliteStore {
    async fn find_account_by_id(
        &self,
        tenant_id: u32,
        account_pk: i64,
    ) -> AppResult<Option<Account>> {
        let table_name = self.accounts_table(tenant_id);
        let sql = format!(
            "SELECT {} FROM {} a WHERE a.id = ?1",
            ACCOUNT_COLUMNS, table_name
        );

        let row = sqlx::query(&sql)
            .bind(account_pk)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find account: {}", e)))?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_accounts_by_user_ids(
        &self,
        tenant_id: u32,
        user_ids: &[String],
    ) -> AppResult<Vec<Account>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let table_name = self.accounts_table(tenant_id);
        let placeholders = (1..=user_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM {} a WHERE a.user_id IN ({})",
            ACCOUNT_COLUMNS, table_name, placeholders
        );

        let mut query = sqlx::query(&sql);
        for user_id in user_ids {
            query = query.bind(user_id);
        }

        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find accounts: {}", e)))?;

        Ok(rows.iter().map(account_from_row).collect())
    }
}
