//! Portal domain module.
//!
//! Business rules for certificates, grievances, property tax, announcements
//! and profiles, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). Records serialize to the row shape the data store keeps.

pub mod announcement;
pub mod certificate;
pub mod dashboard;
pub mod grievance;
pub mod profile;
pub mod property_tax;

pub use announcement::{Announcement, NewAnnouncement};
pub use certificate::{
    Certificate, CertificateApplication, CertificateDecision, CertificateStatus, CertificateType,
    Review, certificate_number,
};
pub use dashboard::{AdminDashboard, CitizenDashboard};
pub use grievance::{Grievance, GrievanceStatus, GrievanceUpdate, NewGrievance, Priority};
pub use profile::{Profile, ProfileUpdate, ProfileView, RoleRecord, UserDirectoryEntry};
pub use property_tax::{
    NewPropertyTax, PropertyTax, PropertyType, TaxCollectionStats, TaxPayment, TaxStatus,
    TaxSummary,
};
