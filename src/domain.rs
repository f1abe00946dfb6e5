//! Domain-level wrappers around raw account and group records.
//!
//! Wrappers receive the store capability as an explicit `Arc` constructor
//! parameter, so they stay usable after the call that produced them without
//! reaching into any global registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::AppResult;
use crate::models::{Account, BackendGroup, MembershipType};
use crate::store::DirectoryStore;

/// User-facing view of an account.
pub struct User {
    account: Account,
    tenant_id: u32,
    store: Arc<dyn DirectoryStore>,
}

impl User {
    pub(crate) fn new(account: Account, tenant_id: u32, store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            account,
            tenant_id,
            store,
        }
    }

    /// External user identifier; the key user-facing code addresses this
    /// user by.
    pub fn user_id(&self) -> &str {
        &self.account.user_id
    }

    /// Display name, falling back to the user identifier when the directory
    /// has none on record.
    pub fn display_name(&self) -> &str {
        match self.account.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.account.user_id,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.account.email.as_deref()
    }

    pub fn last_login(&self) -> i64 {
        self.account.last_login
    }

    pub fn backend(&self) -> &str {
        &self.account.backend
    }

    /// The raw account record this user wraps.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub async fn is_member_of(&self, group: &BackendGroup) -> AppResult<bool> {
        self.store
            .is_user_member(self.tenant_id, group.id, self.account.id)
            .await
    }

    pub async fn is_admin_of(&self, group: &BackendGroup) -> AppResult<bool> {
        self.store
            .is_admin_member(self.tenant_id, group.id, self.account.id)
            .await
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("account", &self.account)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Domain-level view of a group.
pub struct Group {
    group: BackendGroup,
    tenant_id: u32,
    store: Arc<dyn DirectoryStore>,
}

impl Group {
    pub(crate) fn new(group: BackendGroup, tenant_id: u32, store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            group,
            tenant_id,
            store,
        }
    }

    pub fn gid(&self) -> &str {
        &self.group.group_id
    }

    pub fn display_name(&self) -> &str {
        &self.group.display_name
    }

    pub fn backend(&self) -> &str {
        &self.group.backend
    }

    /// The raw group record this wrapper wraps.
    pub fn backend_group(&self) -> &BackendGroup {
        &self.group
    }

    /// Ordinary members of this group, keyed by external user identifier.
    pub async fn users(&self) -> AppResult<HashMap<String, User>> {
        let accounts = self
            .store
            .list_members_of_group(self.tenant_id, self.group.id, &[MembershipType::GroupUser])
            .await?;
        Ok(accounts_to_users(&self.store, self.tenant_id, accounts))
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("group", &self.group)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Map raw account records to `User` wrappers keyed by external user
/// identifier. Accounts that cannot be resolved to a user representation
/// are skipped; duplicate identifiers are last-write-wins.
pub(crate) fn accounts_to_users(
    store: &Arc<dyn DirectoryStore>,
    tenant_id: u32,
    accounts: Vec<Account>,
) -> HashMap<String, User> {
    let mut users = HashMap::with_capacity(accounts.len());
    for account in accounts {
        if !account.is_resolvable() {
            debug!(
                account_pk = account.id,
                tenant_id, "Skipping unresolvable account"
            );
            continue;
        }
        let user_id = account.user_id.clone();
        users.insert(user_id, User::new(account, tenant_id, Arc::clone(store)));
    }
    users
}
