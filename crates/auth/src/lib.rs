//! `egov-auth`: identity and access-gate boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the identity
//! provider and the role directory are traits implemented elsewhere.

pub mod claims;
pub mod gate;
pub mod identity;
pub mod jwt;
pub mod navigation;
pub mod principal;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use gate::{
    AccessGate, Denied, GateState, RoleLookup, RoleLookupError, UNAUTHENTICATED_ENTRY_VIEW,
};
pub use identity::{IdentityError, IdentityProvider, TokenIdentityProvider};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use navigation::{NavItem, NavMenu, NavVariant};
pub use principal::{MetadataPatch, Principal, PrincipalId, Session, UserMetadata};
pub use roles::{Role, RoleAssignment};
