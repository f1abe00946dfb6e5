//! Organisation service: cross-entity orchestration on top of the stores.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{accounts_to_users, Group, User};
use crate::error::AppResult;
use crate::models::{BackendGroup, MembershipType};
use crate::store::DirectoryStore;

/// Orchestrates operations that span groups, memberships, and accounts, and
/// translates raw relation rows into domain-level collections.
pub struct OrganisationService {
    store: Arc<dyn DirectoryStore>,
}

impl OrganisationService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for callers that need direct repository access.
    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    /// Delete a group: memberships first, then the group record.
    ///
    /// The two deletes are independent statements, not one transaction. If
    /// the group-record delete fails after the memberships are gone, the
    /// group is left behind without members; that window is logged and the
    /// error propagated so the caller can reconcile via retry.
    pub async fn delete_group(&self, tenant_id: u32, group: &BackendGroup) -> AppResult<()> {
        self.store
            .remove_all_members_of_group(tenant_id, group.id)
            .await?;

        match self.store.delete_group(tenant_id, group.id).await {
            Ok(_) => {
                info!(gid = %group.group_id, tenant_id, "Deleted group");
                Ok(())
            }
            Err(e) => {
                warn!(
                    gid = %group.group_id,
                    tenant_id,
                    error = %e,
                    "Group record delete failed after memberships were removed"
                );
                Err(e)
            }
        }
    }

    /// Ordinary members of the group, keyed by external user identifier.
    /// Unresolvable accounts are skipped.
    pub async fn get_users_in_group(
        &self,
        tenant_id: u32,
        group: &BackendGroup,
    ) -> AppResult<HashMap<String, User>> {
        let accounts = self
            .store
            .list_members_of_group(tenant_id, group.id, &[MembershipType::GroupUser])
            .await?;
        Ok(accounts_to_users(&self.store, tenant_id, accounts))
    }

    /// Same as `get_users_in_group`, addressing the group by its external
    /// `group_id`.
    pub async fn get_users_in_group_by_gid(
        &self,
        tenant_id: u32,
        gid: &str,
    ) -> AppResult<HashMap<String, User>> {
        let accounts = self
            .store
            .list_members_by_group_id(tenant_id, gid, &[MembershipType::GroupUser])
            .await?;
        Ok(accounts_to_users(&self.store, tenant_id, accounts))
    }

    /// Look up a group by its external `group_id` and wrap it for domain
    /// consumers.
    pub async fn get_group_by_gid(&self, tenant_id: u32, gid: &str) -> AppResult<Group> {
        let group = self.store.get_by_group_id(tenant_id, gid).await?;
        Ok(Group::new(group, tenant_id, Arc::clone(&self.store)))
    }
}
