//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/identity wiring and every view's data access
//! - `routes/`: HTTP routes + handlers (one file per portal area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;

use egov_auth::{Hs256JwtValidator, Role, TokenIdentityProvider};
use egov_store::{GuardedStore, InMemoryBackend, PostgresBackend, assign_role};

use crate::config::{PortalConfig, StoreBackend};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{PortalServices, SharedIdentity, SharedStore};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &PortalConfig) -> anyhow::Result<Router> {
    let store = build_store(&config.store).await?;

    for subject in &config.admin_subjects {
        assign_role(&*store, *subject, Role::Admin)
            .await
            .with_context(|| format!("failed to provision admin {subject}"))?;
    }

    let identity: SharedIdentity = Arc::new(TokenIdentityProvider::new(Hs256JwtValidator::new(
        config.jwt_secret.clone().into_bytes(),
    )));

    Ok(router(Arc::new(PortalServices::new(store, identity))))
}

async fn build_store(backend: &StoreBackend) -> anyhow::Result<SharedStore> {
    match backend {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory record store");
            Ok(Arc::new(GuardedStore::new(InMemoryBackend::new())))
        }
        StoreBackend::Postgres { database_url } => {
            let backend = PostgresBackend::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            backend
                .ensure_schema()
                .await
                .context("failed to create portal schema")?;
            tracing::info!("using Postgres record store");
            Ok(Arc::new(GuardedStore::new(backend)))
        }
    }
}

/// Router over already-built services.
pub fn router(services: Arc<PortalServices>) -> Router {
    let gate = Arc::new(services.gate());

    // Protected views: the gate resolves the view context or redirects.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        gate,
        middleware::gate_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
