use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use egov_auth::PrincipalId;
use egov_core::{DomainResult, Entity, GrievanceId, require_text};

/// Urgency shared by grievances and announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GrievanceStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grievance {
    pub id: GrievanceId,
    pub user_id: PrincipalId,
    pub category: String,
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: GrievanceStatus,
    pub admin_response: Option<String>,
    pub submitted_date: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Grievance {
    type Id = GrievanceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Grievance {
    /// Anything not yet resolved counts as open.
    pub fn is_open(&self) -> bool {
        self.status != GrievanceStatus::Resolved
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGrievance {
    pub category: String,
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

impl NewGrievance {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("category", &self.category)?;
        require_text("subject", &self.subject)?;
        require_text("description", &self.description)
    }
}

/// Administrator's status change, written back as a row patch.
///
/// `admin_response` is always written: a change without a response clears the
/// previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrievanceUpdate {
    pub status: GrievanceStatus,
    pub admin_response: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl GrievanceUpdate {
    pub fn new(
        status: GrievanceStatus,
        admin_response: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            admin_response: admin_response.filter(|r| !r.trim().is_empty()),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egov_core::DomainError;

    fn form(subject: &str) -> NewGrievance {
        NewGrievance {
            category: "water".to_string(),
            subject: subject.to_string(),
            description: "No supply since Monday".to_string(),
            priority: Priority::default(),
        }
    }

    #[test]
    fn blank_subject_fails_validation() {
        let err = form(" ").validate().unwrap_err();
        assert_eq!(err, DomainError::validation("subject must not be empty"));
        assert!(form("Water supply").validate().is_ok());
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_value(GrievanceStatus::InProgress).unwrap();
        assert_eq!(json, "in-progress");
        let parsed: GrievanceStatus = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, GrievanceStatus::InProgress);
    }

    #[test]
    fn priority_defaults_to_normal_when_omitted() {
        let parsed: NewGrievance = serde_json::from_value(serde_json::json!({
            "category": "roads",
            "subject": "Pothole",
            "description": "Near the school",
        }))
        .unwrap();
        assert_eq!(parsed.priority, Priority::Normal);
    }

    #[test]
    fn blank_admin_response_clears_the_previous_one() {
        let update =
            GrievanceUpdate::new(GrievanceStatus::Resolved, Some(" ".to_string()), Utc::now());
        assert!(update.admin_response.is_none());

        let patch = serde_json::to_value(&update).unwrap();
        assert_eq!(patch["admin_response"], serde_json::Value::Null);
        assert_eq!(patch["status"], "resolved");
    }
}
