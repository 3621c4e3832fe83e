//! Role and profile provisioning.
//!
//! These run as [`Caller::Service`]: the gate only ever reads role rows,
//! and citizens are not allowed to write them.

use egov_auth::{Principal, PrincipalId, Role};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::StoreError;
use crate::guarded::{Caller, DataStore};
use crate::query::{Query, Row, maybe_single, row_id};
use crate::table::Table;

/// Outcome of [`register_principal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub role: Role,
    pub role_created: bool,
    pub profile_created: bool,
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn role_of(row: &Row) -> Role {
    row.get("role")
        .and_then(Value::as_str)
        .and_then(|r| r.parse().ok())
        .unwrap_or_default()
}

/// Bind `principal` to `role`. Idempotent; an existing row is updated in place.
pub async fn assign_role<S>(
    store: &S,
    principal: PrincipalId,
    role: Role,
) -> Result<Row, StoreError>
where
    S: DataStore + ?Sized,
{
    let existing = store
        .select(
            &Caller::Service,
            Table::UserRoles,
            Query::new().eq("user_id", principal.to_string()),
        )
        .await?;

    match maybe_single(Table::UserRoles, existing)? {
        Some(row) if role_of(&row) == role => Ok(row),
        Some(row) => {
            let id = row_id(&row)?;
            tracing::info!(principal = %principal, role = %role, "role reassigned");
            store
                .update(
                    &Caller::Service,
                    Table::UserRoles,
                    id,
                    object(json!({ "role": role.as_str() })),
                )
                .await
        }
        None => {
            tracing::info!(principal = %principal, role = %role, "role assigned");
            store
                .insert(
                    &Caller::Service,
                    Table::UserRoles,
                    object(json!({ "user_id": principal.to_string(), "role": role.as_str() })),
                )
                .await
        }
    }
}

/// Ensure a signed-up principal has a role row (citizen unless one exists)
/// and a profile row seeded from its metadata.
pub async fn register_principal<S>(
    store: &S,
    principal: &Principal,
) -> Result<Registration, StoreError>
where
    S: DataStore + ?Sized,
{
    let id = principal.id.to_string();

    let roles = store
        .select(&Caller::Service, Table::UserRoles, Query::new().eq("user_id", id.clone()))
        .await?;
    let (role, role_created) = match maybe_single(Table::UserRoles, roles)? {
        Some(row) => (role_of(&row), false),
        None => {
            assign_role(store, principal.id, Role::Citizen).await?;
            (Role::Citizen, true)
        }
    };

    let profiles = store
        .select(&Caller::Service, Table::Profiles, Query::new().eq("id", id.clone()))
        .await?;
    let profile_created = profiles.is_empty();
    if profile_created {
        store
            .insert(
                &Caller::Service,
                Table::Profiles,
                object(json!({
                    "id": id,
                    "email": principal.email,
                    "full_name": principal.metadata.full_name,
                    "phone": principal.metadata.phone,
                    "address": principal.metadata.address,
                })),
            )
            .await?;
    }

    Ok(Registration {
        role,
        role_created,
        profile_created,
    })
}
