use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an authenticated principal (citizen, administrator).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for Uuid {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Profile attributes carried by the identity provider alongside the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserMetadata {
    /// Apply a partial update; absent fields keep their current value.
    pub fn merge(&mut self, patch: MetadataPatch) {
        if let Some(full_name) = patch.full_name {
            self.full_name = Some(full_name);
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
    }
}

/// Partial metadata update accepted by `IdentityProvider::update_user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// The authenticated subject as seen by this system.
///
/// Its lifecycle is owned by the identity provider; the portal only reads it
/// (and patches metadata through the provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: Option<String>,
    pub metadata: UserMetadata,
}

/// A validated session derived from the presented credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub principal_id: PrincipalId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
