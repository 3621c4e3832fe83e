//! Access gate for protected views.
//!
//! The gate runs a two-state check per navigation:
//!
//! ```text
//! checking ──principal──▶ authorized   (render the view)
//!     └─────none/error──▶ unauthorized (redirect to the entry view)
//! ```
//!
//! `checking` is the only non-terminal state. A separate, best-effort role
//! lookup picks the navigation variant once a principal is known.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::{IdentityError, IdentityProvider};
use crate::navigation::NavVariant;
use crate::{Principal, PrincipalId, Role, RoleAssignment};

/// Where unauthenticated navigations are sent.
pub const UNAUTHENTICATED_ENTRY_VIEW: &str = "/auth";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleLookupError {
    #[error("role lookup failed: {0}")]
    Lookup(String),

    #[error("more than one role assignment matched")]
    Ambiguous,
}

/// Directory of role assignments.
///
/// `find_assignment` has `maybeSingle` semantics: zero or one row, and absence
/// is not an error.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn find_assignment(
        &self,
        principal: PrincipalId,
        role: Role,
    ) -> Result<Option<RoleAssignment>, RoleLookupError>;
}

#[async_trait]
impl<R> RoleLookup for Arc<R>
where
    R: RoleLookup + ?Sized,
{
    async fn find_assignment(
        &self,
        principal: PrincipalId,
        role: Role,
    ) -> Result<Option<RoleAssignment>, RoleLookupError> {
        (**self).find_assignment(principal, role).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authorized(Principal),
    Unauthorized { redirect_to: &'static str },
}

impl GateState {
    /// Resolve the identity lookup. Only `Checking` moves; terminal states are
    /// returned unchanged.
    pub fn settle(self, lookup: Result<Option<Principal>, IdentityError>) -> GateState {
        match self {
            GateState::Checking => match lookup {
                Ok(Some(principal)) => GateState::Authorized(principal),
                Ok(None) => GateState::Unauthorized {
                    redirect_to: UNAUTHENTICATED_ENTRY_VIEW,
                },
                Err(e) => {
                    tracing::debug!(error = %e, "identity lookup failed; treating as anonymous");
                    GateState::Unauthorized {
                        redirect_to: UNAUTHENTICATED_ENTRY_VIEW,
                    }
                }
            },
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GateState::Checking)
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            GateState::Authorized(p) => Some(p),
            _ => None,
        }
    }
}

/// Outcome of a gated navigation that did not render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied {
    pub redirect_to: &'static str,
}

pub struct AccessGate<I, R> {
    identity: I,
    roles: R,
}

impl<I, R> AccessGate<I, R>
where
    I: IdentityProvider,
    R: RoleLookup,
{
    pub fn new(identity: I, roles: R) -> Self {
        Self { identity, roles }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Run the principal check to a terminal state.
    pub async fn check(&self, token: Option<&str>) -> GateState {
        GateState::Checking.settle(self.identity.current_user(token).await)
    }

    /// Render `view` only once the check has authorized a principal.
    ///
    /// `view` is invoked at most once, and never before the identity lookup
    /// has resolved.
    pub async fn guard<F, Fut, T>(&self, token: Option<&str>, view: F) -> Result<T, Denied>
    where
        F: FnOnce(Principal) -> Fut,
        Fut: Future<Output = T>,
    {
        match self.check(token).await {
            GateState::Authorized(principal) => Ok(view(principal).await),
            GateState::Unauthorized { redirect_to } => Err(Denied { redirect_to }),
            GateState::Checking => Err(Denied {
                redirect_to: UNAUTHENTICATED_ENTRY_VIEW,
            }),
        }
    }

    /// Best-effort navigation variant for an authorized principal.
    ///
    /// Lookup failures and missing rows fall back to the citizen variant.
    pub async fn navigation_variant(&self, principal: &Principal) -> NavVariant {
        match self.roles.find_assignment(principal.id, Role::Admin).await {
            Ok(Some(assignment)) if assignment.role == Role::Admin => NavVariant::Admin,
            Ok(_) => NavVariant::Citizen,
            Err(e) => {
                tracing::warn!(
                    principal_id = %principal.id,
                    error = %e,
                    "role lookup failed; using citizen navigation"
                );
                NavVariant::Citizen
            }
        }
    }
}
