use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use egov_auth::PrincipalId;
use egov_core::{CertificateId, DomainError, DomainResult, Entity, require_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateType {
    Birth,
    Death,
    Income,
    Residence,
}

/// Application lifecycle: `pending` until an administrator reviews it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub user_id: PrincipalId,
    pub certificate_type: CertificateType,
    pub applicant_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub address: Option<String>,
    pub purpose: Option<String>,
    #[serde(default)]
    pub status: CertificateStatus,
    pub certificate_number: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub application_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Certificate {
    type Id = CertificateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A citizen's application form. Serializes to the insert row (minus `user_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateApplication {
    pub certificate_type: CertificateType,
    pub applicant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl CertificateApplication {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("applicant_name", &self.applicant_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    Approve,
    Reject { remarks: Option<String> },
}

/// Columns written back when a certificate is reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateDecision {
    pub status: CertificateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// `CERT-<unix millis>-<0..=999>`.
pub fn certificate_number<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    format!("CERT-{}-{}", now.timestamp_millis(), rng.gen_range(0..1000))
}

impl Certificate {
    pub fn is_pending(&self) -> bool {
        self.status == CertificateStatus::Pending
    }

    /// Decide a pending application. Approval issues a number and an issue
    /// date; rejection leaves both unset.
    pub fn review<R: Rng>(
        &self,
        review: Review,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DomainResult<CertificateDecision> {
        if !self.is_pending() {
            return Err(DomainError::invariant(format!(
                "certificate {} has already been reviewed",
                self.id
            )));
        }

        Ok(match review {
            Review::Approve => CertificateDecision {
                status: CertificateStatus::Approved,
                certificate_number: Some(certificate_number(now, rng)),
                issue_date: Some(now),
                remarks: None,
            },
            Review::Reject { remarks } => CertificateDecision {
                status: CertificateStatus::Rejected,
                certificate_number: None,
                issue_date: None,
                remarks: remarks.filter(|r| !r.trim().is_empty()),
            },
        })
    }
}
