use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use egov_auth::NavVariant;
use egov_core::DomainError;
use egov_portal::{
    CertificateApplication, CertificateType, GrievanceStatus, PropertyTax, TaxCollectionStats,
    TaxSummary,
};

use crate::app::errors::ServiceError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ApplyCertificateRequest {
    #[serde(alias = "type")]
    pub certificate_type: CertificateType,
    pub applicant_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub address: Option<String>,
    pub purpose: Option<String>,
}

impl From<ApplyCertificateRequest> for CertificateApplication {
    fn from(req: ApplyCertificateRequest) -> Self {
        // Empty optional inputs from forms are treated as absent.
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            certificate_type: req.certificate_type,
            applicant_name: req.applicant_name.trim().to_string(),
            date_of_birth: req.date_of_birth,
            parent_name: non_blank(req.parent_name),
            address: non_blank(req.address),
            purpose: non_blank(req.purpose),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectCertificateRequest {
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGrievanceStatusRequest {
    pub status: GrievanceStatus,
    pub admin_response: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Serialize)]
pub struct CitizenTaxView {
    pub items: Vec<PropertyTax>,
    pub summary: TaxSummary,
}

#[derive(Debug, Serialize)]
pub struct AdminTaxView {
    pub items: Vec<PropertyTax>,
    pub stats: TaxCollectionStats,
}

#[derive(Debug, Serialize)]
pub struct DashboardView<T> {
    pub navigation: NavVariant,
    pub stats: T,
}

/// Parse a path identifier, mapping failures to a 400.
pub fn parse_id<T>(raw: &str) -> Result<T, ServiceError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ServiceError::from)
}
