//! Policy-enforcing data store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use egov_auth::PrincipalId;
use serde_json::Value;
use uuid::Uuid;

use crate::backend::RecordBackend;
use crate::error::StoreError;
use crate::policy::{Access, Operation, Tier, access};
use crate::query::{Query, Row};
use crate::table::Table;

/// Who is issuing a store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Principal(PrincipalId),
    /// Provisioning and seeding. Bypasses row-level policy.
    Service,
}

/// Data store seam used by every view.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(
        &self,
        caller: &Caller,
        table: Table,
        query: Query,
    ) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, caller: &Caller, table: Table, row: Row) -> Result<Row, StoreError>;

    async fn update(
        &self,
        caller: &Caller,
        table: Table,
        id: Uuid,
        patch: Row,
    ) -> Result<Row, StoreError>;
}

#[async_trait]
impl<S> DataStore for Arc<S>
where
    S: DataStore + ?Sized,
{
    async fn select(
        &self,
        caller: &Caller,
        table: Table,
        query: Query,
    ) -> Result<Vec<Row>, StoreError> {
        (**self).select(caller, table, query).await
    }

    async fn insert(&self, caller: &Caller, table: Table, row: Row) -> Result<Row, StoreError> {
        (**self).insert(caller, table, row).await
    }

    async fn update(
        &self,
        caller: &Caller,
        table: Table,
        id: Uuid,
        patch: Row,
    ) -> Result<Row, StoreError> {
        (**self).update(caller, table, id, patch).await
    }
}

/// Applies the row-level access policy in front of a [`RecordBackend`].
///
/// Admin status is read from `user_roles` on every call, so a caller's
/// privileges never depend on what navigation variant it was shown.
#[derive(Debug)]
pub struct GuardedStore<B> {
    backend: B,
}

impl<B: RecordBackend> GuardedStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    async fn tier(&self, caller: &Caller) -> Result<Tier, StoreError> {
        let principal = match caller {
            Caller::Service => return Ok(Tier::Service),
            Caller::Principal(id) => *id,
        };

        let admin_rows = self
            .backend
            .select(
                Table::UserRoles,
                &Query::new()
                    .eq("user_id", principal.to_string())
                    .eq("role", "admin")
                    .limit(1),
            )
            .await?;

        Ok(if admin_rows.is_empty() {
            Tier::Citizen(principal)
        } else {
            Tier::Admin(principal)
        })
    }
}

fn violation(table: Table, operation: Operation) -> StoreError {
    StoreError::PolicyViolation {
        table: table.name(),
        operation,
    }
}

fn owner_of(tier: Tier) -> Option<PrincipalId> {
    match tier {
        Tier::Citizen(id) => Some(id),
        _ => None,
    }
}

#[async_trait]
impl<B: RecordBackend> DataStore for GuardedStore<B> {
    async fn select(
        &self,
        caller: &Caller,
        table: Table,
        query: Query,
    ) -> Result<Vec<Row>, StoreError> {
        let tier = self.tier(caller).await?;
        let query = match access(tier, table, Operation::Select) {
            Access::Denied => return Ok(Vec::new()),
            Access::All => query,
            Access::Own => match (table.owner_column(), owner_of(tier)) {
                (Some(column), Some(owner)) => query.eq(column, owner.to_string()),
                _ => return Ok(Vec::new()),
            },
        };
        self.backend.select(table, &query).await
    }

    async fn insert(&self, caller: &Caller, table: Table, mut row: Row) -> Result<Row, StoreError> {
        let tier = self.tier(caller).await?;
        match access(tier, table, Operation::Insert) {
            Access::Denied => return Err(violation(table, Operation::Insert)),
            Access::All => {}
            Access::Own => {
                let owner = owner_of(tier).map(|id| Value::String(id.to_string()));
                let column = table.owner_column();
                let owned = match (column, owner) {
                    (Some(column), Some(owner)) => row.get(column) == Some(&owner),
                    _ => false,
                };
                if !owned {
                    tracing::warn!(
                        table = %table,
                        "insert rejected: owner column does not match caller"
                    );
                    return Err(violation(table, Operation::Insert));
                }
            }
        }

        table.apply_defaults(&mut row, Utc::now());
        let stored = self.backend.insert(table, row).await?;
        tracing::debug!(table = %table, "row inserted");
        Ok(stored)
    }

    async fn update(
        &self,
        caller: &Caller,
        table: Table,
        id: Uuid,
        mut patch: Row,
    ) -> Result<Row, StoreError> {
        let tier = self.tier(caller).await?;
        patch.remove("id");

        match access(tier, table, Operation::Update) {
            Access::Denied => return Err(violation(table, Operation::Update)),
            Access::All => {}
            Access::Own => {
                let (Some(column), Some(owner)) = (table.owner_column(), owner_of(tier)) else {
                    return Err(violation(table, Operation::Update));
                };
                let visible = self
                    .backend
                    .select(
                        table,
                        &Query::new()
                            .eq("id", id.to_string())
                            .eq(column, owner.to_string()),
                    )
                    .await?;
                if visible.is_empty() {
                    return Err(StoreError::NotFound {
                        table: table.name(),
                        id,
                    });
                }
                patch.remove(column);
            }
        }

        let updated = self.backend.update(table, id, patch).await?;
        tracing::debug!(table = %table, id = %id, "row updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    async fn store_with_admin() -> (GuardedStore<InMemoryBackend>, PrincipalId) {
        let store = GuardedStore::new(InMemoryBackend::new());
        let admin = PrincipalId::new();
        store
            .insert(
                &Caller::Service,
                Table::UserRoles,
                row(json!({"user_id": admin.to_string(), "role": "admin"})),
            )
            .await
            .unwrap();
        (store, admin)
    }

    #[tokio::test]
    async fn citizens_only_see_their_own_rows() {
        let (store, _) = store_with_admin().await;
        let alice = PrincipalId::new();
        let bob = PrincipalId::new();

        for who in [alice, bob] {
            store
                .insert(
                    &Caller::Principal(who),
                    Table::Certificates,
                    row(json!({"user_id": who.to_string(), "applicant_name": "x"})),
                )
                .await
                .unwrap();
        }

        // Even an explicit filter on someone else's id returns nothing.
        let peek = store
            .select(
                &Caller::Principal(alice),
                Table::Certificates,
                Query::new().eq("user_id", bob.to_string()),
            )
            .await
            .unwrap();
        assert!(peek.is_empty());

        let own = store
            .select(&Caller::Principal(alice), Table::Certificates, Query::new())
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0]["status"], "pending");
    }

    #[tokio::test]
    async fn admins_see_everything() {
        let (store, admin) = store_with_admin().await;
        for _ in 0..3 {
            let who = PrincipalId::new();
            store
                .insert(
                    &Caller::Principal(who),
                    Table::Grievances,
                    row(json!({"user_id": who.to_string(), "subject": "s"})),
                )
                .await
                .unwrap();
        }

        let all = store
            .select(&Caller::Principal(admin), Table::Grievances, Query::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn inserting_for_another_principal_is_a_violation() {
        let (store, _) = store_with_admin().await;
        let err = store
            .insert(
                &Caller::Principal(PrincipalId::new()),
                Table::Grievances,
                row(json!({"user_id": PrincipalId::new().to_string()})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PolicyViolation { .. }));
    }

    #[tokio::test]
    async fn citizens_cannot_escalate_or_review() {
        let (store, _) = store_with_admin().await;
        let citizen = PrincipalId::new();
        let caller = Caller::Principal(citizen);

        let err = store
            .insert(
                &caller,
                Table::UserRoles,
                row(json!({"user_id": citizen.to_string(), "role": "admin"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PolicyViolation { .. }));

        let cert = store
            .insert(
                &caller,
                Table::Certificates,
                row(json!({"user_id": citizen.to_string()})),
            )
            .await
            .unwrap();
        let id = crate::query::row_id(&cert).unwrap();
        let err = store
            .update(&caller, Table::Certificates, id, row(json!({"status": "approved"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PolicyViolation { .. }));
    }

    #[tokio::test]
    async fn updating_an_invisible_row_is_not_found() {
        let (store, admin) = store_with_admin().await;
        let owner = PrincipalId::new();
        let tax = store
            .insert(
                &Caller::Principal(admin),
                Table::PropertyTax,
                row(json!({"user_id": owner.to_string(), "tax_amount": "100"})),
            )
            .await
            .unwrap();
        let id = crate::query::row_id(&tax).unwrap();

        let err = store
            .update(
                &Caller::Principal(PrincipalId::new()),
                Table::PropertyTax,
                id,
                row(json!({"status": "paid"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let paid = store
            .update(
                &Caller::Principal(owner),
                Table::PropertyTax,
                id,
                row(json!({"status": "paid", "user_id": PrincipalId::new().to_string()})),
            )
            .await
            .unwrap();
        assert_eq!(paid["status"], "paid");
        assert_eq!(paid["user_id"], owner.to_string());
    }
}
