use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use egov_core::{AnnouncementId, DomainResult, Entity, require_text};

use crate::grievance::Priority;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    pub published_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Announcement {
    type Id = AnnouncementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl NewAnnouncement {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        require_text("category", &self.category)
    }
}
