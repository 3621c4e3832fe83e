//! Dashboard counters.

use rust_decimal::Decimal;
use serde::Serialize;

use egov_auth::Role;

use crate::certificate::{Certificate, CertificateStatus};
use crate::grievance::Grievance;
use crate::profile::RoleRecord;
use crate::property_tax::PropertyTax;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitizenDashboard {
    pub total_certificates: usize,
    pub pending_certificates: usize,
    pub total_grievances: usize,
    pub open_grievances: usize,
    pub property_tax_due: usize,
    pub announcements: usize,
}

impl CitizenDashboard {
    pub fn compute(
        certificates: &[Certificate],
        grievances: &[Grievance],
        taxes: &[PropertyTax],
        announcements: usize,
    ) -> Self {
        Self {
            total_certificates: certificates.len(),
            pending_certificates: certificates.iter().filter(|c| c.is_pending()).count(),
            total_grievances: grievances.len(),
            open_grievances: grievances.iter().filter(|g| g.is_open()).count(),
            property_tax_due: taxes.iter().filter(|t| !t.is_paid()).count(),
            announcements,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminDashboard {
    pub total_citizens: usize,
    pub pending_certificates: usize,
    pub approved_certificates: usize,
    pub open_grievances: usize,
    pub resolved_grievances: usize,
    pub tax_collection: Decimal,
}

impl AdminDashboard {
    pub fn compute(
        roles: &[RoleRecord],
        certificates: &[Certificate],
        grievances: &[Grievance],
        taxes: &[PropertyTax],
    ) -> Self {
        let open = grievances.iter().filter(|g| g.is_open()).count();
        Self {
            total_citizens: roles.iter().filter(|r| r.role == Role::Citizen).count(),
            pending_certificates: certificates.iter().filter(|c| c.is_pending()).count(),
            approved_certificates: certificates
                .iter()
                .filter(|c| c.status == CertificateStatus::Approved)
                .count(),
            open_grievances: open,
            resolved_grievances: grievances.len() - open,
            tax_collection: taxes
                .iter()
                .filter(|t| t.is_paid())
                .map(|t| t.tax_amount)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grievance::{GrievanceStatus, Priority};
    use chrono::Utc;
    use egov_auth::PrincipalId;
    use egov_core::GrievanceId;

    fn grievance(status: GrievanceStatus) -> Grievance {
        Grievance {
            id: GrievanceId::new(),
            user_id: PrincipalId::new(),
            category: "water".to_string(),
            subject: "s".to_string(),
            description: "d".to_string(),
            priority: Priority::Normal,
            status,
            admin_response: None,
            submitted_date: Utc::now(),
            updated_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn in_progress_grievances_are_open() {
        let grievances = vec![
            grievance(GrievanceStatus::Pending),
            grievance(GrievanceStatus::InProgress),
            grievance(GrievanceStatus::Resolved),
        ];
        let citizen = CitizenDashboard::compute(&[], &grievances, &[], 4);
        assert_eq!(citizen.total_grievances, 3);
        assert_eq!(citizen.open_grievances, 2);
        assert_eq!(citizen.announcements, 4);

        let admin = AdminDashboard::compute(&[], &[], &grievances, &[]);
        assert_eq!(admin.open_grievances, 2);
        assert_eq!(admin.resolved_grievances, 1);
        assert_eq!(admin.tax_collection, Decimal::ZERO);
    }

    #[test]
    fn only_citizen_roles_count_as_citizens() {
        let roles = vec![
            RoleRecord {
                user_id: PrincipalId::new(),
                role: Role::Citizen,
                created_at: Utc::now(),
            },
            RoleRecord {
                user_id: PrincipalId::new(),
                role: Role::Admin,
                created_at: Utc::now(),
            },
        ];
        assert_eq!(AdminDashboard::compute(&roles, &[], &[], &[]).total_citizens, 1);
    }
}
