use egov_auth::{NavVariant, Principal, PrincipalId};
use egov_store::Caller;

/// Per-request view context, resolved once by the gate middleware.
///
/// Present on every protected route; handlers take it explicitly instead of
/// asking the identity provider again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    principal: Principal,
    variant: NavVariant,
}

impl ViewContext {
    pub fn new(principal: Principal, variant: NavVariant) -> Self {
        Self { principal, variant }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }

    pub fn variant(&self) -> NavVariant {
        self.variant
    }

    /// Store caller for data issued on behalf of this principal.
    pub fn caller(&self) -> Caller {
        Caller::Principal(self.principal.id)
    }
}
