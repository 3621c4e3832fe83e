//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Store and transport failures belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank applicant name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. reviewing an already-approved certificate).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflicting state transition (e.g. paying an already-paid tax record).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// Reject blank (empty or whitespace-only) text fields.
pub fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_rejects_whitespace() {
        assert!(require_text("subject", "  \t").is_err());
        assert!(require_text("subject", "Broken pipe").is_ok());
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = require_text("applicant_name", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: applicant_name must not be empty"
        );
    }
}
