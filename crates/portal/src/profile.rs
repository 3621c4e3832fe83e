use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use egov_auth::{MetadataPatch, Principal, PrincipalId, Role, UserMetadata};

/// Row of the `profiles` table, keyed by principal id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: PrincipalId,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Profile columns touched by a metadata patch; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&MetadataPatch> for ProfileUpdate {
    fn from(patch: &MetadataPatch) -> Self {
        Self {
            full_name: patch.full_name.clone(),
            phone: patch.phone.clone(),
            address: patch.address.clone(),
        }
    }
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// What the profile page shows for the signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub id: PrincipalId,
    pub email: Option<String>,
    pub metadata: UserMetadata,
    pub created_at: Option<DateTime<Utc>>,
    pub role: Role,
}

impl ProfileView {
    pub fn new(principal: &Principal, profile: Option<&Profile>, role: Option<Role>) -> Self {
        Self {
            id: principal.id,
            email: principal.email.clone(),
            metadata: principal.metadata.clone(),
            created_at: profile.and_then(|p| p.created_at),
            role: role.unwrap_or_default(),
        }
    }
}

/// Row of the `user_roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub user_id: PrincipalId,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Administrator's user listing: role rows joined with profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDirectoryEntry {
    pub user_id: PrincipalId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UserDirectoryEntry {
    /// Left join: principals without a profile row still appear.
    pub fn join(roles: Vec<RoleRecord>, profiles: &[Profile]) -> Vec<Self> {
        roles
            .into_iter()
            .map(|r| {
                let profile = profiles.iter().find(|p| p.id == r.user_id);
                Self {
                    user_id: r.user_id,
                    role: r.role,
                    created_at: r.created_at,
                    email: profile.and_then(|p| p.email.clone()),
                    full_name: profile.and_then(|p| p.full_name.clone()),
                    phone: profile.and_then(|p| p.phone.clone()),
                    address: profile.and_then(|p| p.address.clone()),
                }
            })
            .collect()
    }
}
