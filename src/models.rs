use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Role an account holds within a group.
///
/// An account may hold both roles in the same group at once; each role is a
/// distinct relation row, not a flag on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    GroupUser,
    GroupAdmin,
}

impl MembershipType {
    /// Both roles, in storage order. Used for bulk operations that span the
    /// whole relation (e.g. clearing a group before deleting it).
    pub const ALL: [MembershipType; 2] = [MembershipType::GroupUser, MembershipType::GroupAdmin];

    /// Storage representation in the `membership_type` column.
    pub fn as_i64(self) -> i64 {
        match self {
            MembershipType::GroupUser => 0,
            MembershipType::GroupAdmin => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(MembershipType::GroupUser),
            1 => Some(MembershipType::GroupAdmin),
            _ => None,
        }
    }
}

/// A group record as persisted by the group store.
///
/// `id` is the opaque storage primary key; `group_id` is the unique external
/// group-name reported by the originating backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendGroup {
    pub id: i64,
    pub group_id: String,
    pub display_name: String,
    /// Identifier of the group-providing backend this group originated from.
    pub backend: String,
}

/// A group that has not been persisted yet; the store assigns the primary key
/// on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBackendGroup {
    pub group_id: String,
    pub display_name: String,
    pub backend: String,
}

impl NewBackendGroup {
    pub fn new(group_id: &str, display_name: &str, backend: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            display_name: display_name.to_string(),
            backend: backend.to_string(),
        }
    }
}

/// Lifecycle state of an account, as recorded by the account directory.
pub mod account_state {
    pub const INITIAL: i64 = 0;
    pub const ENABLED: i64 = 1;
    pub const DISABLED: i64 = 2;
    pub const DELETED: i64 = 3;
}

/// An account record owned by the collaborating account directory.
///
/// This core reads accounts (directly or through membership joins) but never
/// creates, mutates, or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// External user identifier, the key under which user-facing code
    /// addresses this account.
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// Unix timestamp of the last login, 0 if the account never logged in.
    pub last_login: i64,
    pub backend: String,
    pub state: i64,
    pub quota: Option<String>,
    pub home: Option<String>,
}

impl Account {
    /// Whether this account can be turned into a user-facing representation.
    /// Accounts without an external identifier or already marked deleted
    /// cannot.
    pub fn is_resolvable(&self) -> bool {
        !self.user_id.is_empty() && self.state != account_state::DELETED
    }

    /// Last login as a UTC timestamp, `None` if the account never logged in.
    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        if self.last_login <= 0 {
            return None;
        }
        Utc.timestamp_opt(self.last_login, 0).single()
    }
}
