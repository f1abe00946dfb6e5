use async_trait::async_trait;

use super::{group_from_row, is_unique_violation, SqliteStore};
use crate::error::{AppError, AppResult};
use crate::models::{BackendGroup, NewBackendGroup};
use crate::store::{GroupSearchField, GroupStore};

/// Escape LIKE wildcard characters so a pattern is matched literally.
/// `\` is the escape character declared in the query.
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '\\' || c == '%' || c == '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl GroupStore for SqliteStore {
    async fn insert_group(
        &self,
        tenant_id: u32,
        group: &NewBackendGroup,
    ) -> AppResult<BackendGroup> {
        let table_name = self.groups_table(tenant_id);
        let sql = format!(
            "INSERT INTO {} (group_id, display_name, backend) VALUES (?1, ?2, ?3)",
            table_name
        );

        let result = sqlx::query(&sql)
            .bind(&group.group_id)
            .bind(&group.display_name)
            .bind(&group.backend)
            .execute(self.pool())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::ConstraintViolation(format!(
                        "Group '{}' already exists",
                        group.group_id
                    ))
                } else {
                    AppError::Database(format!("Failed to insert group: {}", e))
                }
            })?;

        Ok(BackendGroup {
            id: result.last_insert_rowid(),
            group_id: group.group_id.clone(),
            display_name: group.display_name.clone(),
            backend: group.backend.clone(),
        })
    }

    async fn get_by_group_id(&self, tenant_id: u32, gid: &str) -> AppResult<BackendGroup> {
        let table_name = self.groups_table(tenant_id);
        // LIMIT 2 is enough to tell "exactly one" from "more than one"
        let sql = format!(
            "SELECT id, group_id, display_name, backend FROM {} WHERE group_id = ?1 LIMIT 2",
            table_name
        );

        let rows = sqlx::query(&sql)
            .bind(gid)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find group: {}", e)))?;

        match rows.len() {
            0 => Err(AppError::NotFound(format!("Group '{}' does not exist", gid))),
            1 => Ok(group_from_row(&rows[0])),
            _ => Err(AppError::MultipleResults(format!(
                "More than one group matches '{}'",
                gid
            ))),
        }
    }

    async fn search_groups(
        &self,
        tenant_id: u32,
        field: GroupSearchField,
        pattern: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BackendGroup>> {
        let table_name = self.groups_table(tenant_id);
        let column = field.column();

        let sql = format!(
            "SELECT id, group_id, display_name, backend FROM {} \
             WHERE LOWER({}) LIKE ?1 ESCAPE '\\' \
             ORDER BY {} ASC LIMIT ?2 OFFSET ?3",
            table_name, column, column
        );

        let like_pattern = format!("%{}%", escape_like(&pattern.to_lowercase()));

        let rows = sqlx::query(&sql)
            .bind(&like_pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to search groups: {}", e)))?;

        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn delete_group(&self, tenant_id: u32, group_pk: i64) -> AppResult<bool> {
        let table_name = self.groups_table(tenant_id);
        let sql = format!("DELETE FROM {} WHERE id = ?1", table_name);

        let result = sqlx::query(&sql)
            .bind(group_pk)
            .execute(self.pool())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete group: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
