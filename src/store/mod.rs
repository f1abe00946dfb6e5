//! Storage layer for groups, memberships, and account lookups.
//!
//! Each entity gets its own narrow repository trait exposing only the
//! operations the organisation layer needs; there is no generic CRUD base.
//! The role dimension on memberships means there is no single mutable
//! "membership" object, only presence or absence of role-tagged relation
//! rows, so mutation is expressed as single-purpose statements.

use crate::error::AppResult;
use crate::models::{Account, BackendGroup, MembershipType, NewBackendGroup};
use async_trait::async_trait;
use std::sync::Arc;

pub mod config;
pub mod sqlite;

pub use config::StoreBackendConfig;
pub use sqlite::SqliteStore;

/// Group fields the pattern search may target. An allow-list, so caller
/// input can never select an arbitrary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSearchField {
    GroupId,
    DisplayName,
}

impl GroupSearchField {
    /// Resolve an attribute name as callers spell it (camelCase or
    /// snake_case) to a searchable field.
    pub fn from_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "groupId" | "group_id" => Some(GroupSearchField::GroupId),
            "displayName" | "display_name" => Some(GroupSearchField::DisplayName),
            _ => None,
        }
    }

    /// Column name in the groups table.
    pub fn column(self) -> &'static str {
        match self {
            GroupSearchField::GroupId => "group_id",
            GroupSearchField::DisplayName => "display_name",
        }
    }
}

/// Core store lifecycle operations every backend must implement.
#[async_trait]
pub trait Store: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &StoreBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Initialize tenant-specific tables if needed
    async fn init_tenant(&self, tenant_id: u32) -> AppResult<()>;

    /// Clean up resources when the store is no longer needed
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Repository for group records.
#[async_trait]
pub trait GroupStore: Store {
    /// Persist a new group and return it with the assigned primary key.
    /// Fails with `ConstraintViolation` if the external group-name is
    /// already taken.
    async fn insert_group(
        &self,
        tenant_id: u32,
        group: &NewBackendGroup,
    ) -> AppResult<BackendGroup>;

    /// Find the single group whose external `group_id` equals `gid`.
    /// Fails with `NotFound` if none and `MultipleResults` if more than one
    /// row matches (the field is expected to be unique; more than one match
    /// means corrupted state).
    async fn get_by_group_id(&self, tenant_id: u32, gid: &str) -> AppResult<BackendGroup>;

    /// Case-insensitive substring search over the given field, ordered
    /// ascending by that field and paginated. Wildcard characters in the
    /// pattern are matched literally.
    async fn search_groups(
        &self,
        tenant_id: u32,
        field: GroupSearchField,
        pattern: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BackendGroup>>;

    /// Delete a group record by primary key. Returns whether a row was
    /// deleted; deleting an absent group is not an error.
    async fn delete_group(&self, tenant_id: u32, group_pk: i64) -> AppResult<bool>;
}

/// Repository for the (group, account, role) membership relation.
#[async_trait]
pub trait MembershipStore: Store {
    /// Insert one relation row. Returns `Ok(false)` when the identical
    /// (group, account, role) row already exists: the second of two racing
    /// inserts observes the unique-constraint rejection and reports failure
    /// instead of erroring. A row referencing a nonexistent group or
    /// account fails with `ConstraintViolation`.
    async fn add_member(
        &self,
        tenant_id: u32,
        group_pk: i64,
        account_pk: i64,
        membership_type: MembershipType,
    ) -> AppResult<bool>;

    async fn add_user_member(&self, tenant_id: u32, group_pk: i64, account_pk: i64) -> AppResult<bool> {
        self.add_member(tenant_id, group_pk, account_pk, MembershipType::GroupUser)
            .await
    }

    async fn add_admin_member(
        &self,
        tenant_id: u32,
        group_pk: i64,
        account_pk: i64,
    ) -> AppResult<bool> {
        self.add_member(tenant_id, group_pk, account_pk, MembershipType::GroupAdmin)
            .await
    }

    /// Delete the `GROUP_USER` relation row for the pair; an admin row for
    /// the same pair is left untouched. Absence of a matching row is
    /// success.
    async fn remove_member(&self, tenant_id: u32, group_pk: i64, account_pk: i64) -> AppResult<()>;

    /// Delete every relation row of the group, both roles. Idempotent;
    /// used as the first step of group deletion.
    async fn remove_all_members_of_group(&self, tenant_id: u32, group_pk: i64) -> AppResult<()>;

    /// Existence probe for the exact (group, account, role) triple.
    async fn is_member(
        &self,
        tenant_id: u32,
        group_pk: i64,
        account_pk: i64,
        membership_type: MembershipType,
    ) -> AppResult<bool>;

    async fn is_user_member(&self, tenant_id: u32, group_pk: i64, account_pk: i64) -> AppResult<bool> {
        self.is_member(tenant_id, group_pk, account_pk, MembershipType::GroupUser)
            .await
    }

    async fn is_admin_member(
        &self,
        tenant_id: u32,
        group_pk: i64,
        account_pk: i64,
    ) -> AppResult<bool> {
        self.is_member(tenant_id, group_pk, account_pk, MembershipType::GroupAdmin)
            .await
    }

    /// Full account records of every account holding one of the given roles
    /// in the group. Deduplicated at the account level: an account holding
    /// both roles appears once. Row order is storage-determined.
    async fn list_members_of_group(
        &self,
        tenant_id: u32,
        group_pk: i64,
        membership_types: &[MembershipType],
    ) -> AppResult<Vec<Account>>;

    /// Same as `list_members_of_group`, but the group is addressed by its
    /// external `group_id` via a join through the groups table.
    async fn list_members_by_group_id(
        &self,
        tenant_id: u32,
        gid: &str,
        membership_types: &[MembershipType],
    ) -> AppResult<Vec<Account>>;
}

/// Read-only view of the collaborating account directory. This core never
/// creates, mutates, or deletes accounts.
#[async_trait]
pub trait AccountDirectory: Store {
    /// Find an account by primary key
    async fn find_account_by_id(&self, tenant_id: u32, account_pk: i64)
        -> AppResult<Option<Account>>;

    /// Find accounts by a set of external user identifiers
    async fn find_accounts_by_user_ids(
        &self,
        tenant_id: u32,
        user_ids: &[String],
    ) -> AppResult<Vec<Account>>;
}

/// Combined store interface for backends that handle all three concerns in
/// a unified manner.
pub trait DirectoryStore: GroupStore + MembershipStore + AccountDirectory {}

impl<T> DirectoryStore for T where T: GroupStore + MembershipStore + AccountDirectory {}

/// Factory for creating store instances
pub struct StoreFactory;

impl StoreFactory {
    pub async fn create(config: &StoreBackendConfig) -> AppResult<Arc<dyn DirectoryStore>> {
        let store = sqlite::SqliteStore::connect(config).await?;
        Ok(Arc::new(store))
    }
}
