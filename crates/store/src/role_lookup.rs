use async_trait::async_trait;
use egov_auth::{PrincipalId, Role, RoleAssignment, RoleLookup, RoleLookupError};
use serde_json::Value;

use crate::error::StoreError;
use crate::guarded::{Caller, DataStore};
use crate::query::{Query, maybe_single};
use crate::table::Table;

/// Resolves role assignments from the `user_roles` table on behalf of the
/// principal itself, so the lookup is subject to the same policy as any
/// other read.
#[derive(Debug, Clone)]
pub struct StoreRoleLookup<S> {
    store: S,
}

impl<S> StoreRoleLookup<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: DataStore> RoleLookup for StoreRoleLookup<S> {
    async fn find_assignment(
        &self,
        principal: PrincipalId,
        role: Role,
    ) -> Result<Option<RoleAssignment>, RoleLookupError> {
        let rows = self
            .store
            .select(
                &Caller::Principal(principal),
                Table::UserRoles,
                Query::new()
                    .eq("user_id", principal.to_string())
                    .eq("role", role.as_str()),
            )
            .await
            .map_err(|e| RoleLookupError::Lookup(e.to_string()))?;

        let row = maybe_single(Table::UserRoles, rows).map_err(|e| match e {
            StoreError::MultipleRows { .. } => RoleLookupError::Ambiguous,
            other => RoleLookupError::Lookup(other.to_string()),
        })?;

        row.map(|r| serde_json::from_value::<RoleAssignment>(Value::Object(r)))
            .transpose()
            .map_err(|e| RoleLookupError::Lookup(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::guarded::GuardedStore;
    use crate::provisioning::assign_role;
    use std::sync::Arc;

    #[tokio::test]
    async fn finds_the_admin_row_and_nothing_for_citizens() {
        let store = Arc::new(GuardedStore::new(InMemoryBackend::new()));
        let admin = PrincipalId::new();
        let citizen = PrincipalId::new();
        assign_role(&*store, admin, Role::Admin).await.unwrap();
        assign_role(&*store, citizen, Role::Citizen).await.unwrap();

        let lookup = StoreRoleLookup::new(store);
        let found = lookup.find_assignment(admin, Role::Admin).await.unwrap();
        assert_eq!(
            found,
            Some(RoleAssignment {
                user_id: admin,
                role: Role::Admin
            })
        );
        assert_eq!(lookup.find_assignment(citizen, Role::Admin).await.unwrap(), None);
        assert_eq!(
            lookup
                .find_assignment(PrincipalId::new(), Role::Admin)
                .await
                .unwrap(),
            None
        );
    }
}
