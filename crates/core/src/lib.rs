//! `egov-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{require_text, DomainError, DomainResult};
pub use id::{AnnouncementId, CertificateId, GrievanceId, PropertyTaxId};
