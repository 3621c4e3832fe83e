use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use egov_auth::MetadataPatch;

use crate::app::services::PortalServices;
use crate::context::ViewContext;

pub async fn get_profile(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(services.profile(&ctx).await)
}

pub async fn update_profile(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Json(body): Json<MetadataPatch>,
) -> axum::response::Response {
    match services.update_profile(&ctx, body).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Provision the citizen role and profile row for the signed-in principal.
pub async fn register(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> axum::response::Response {
    match services.register(&ctx).await {
        Ok(registration) => (StatusCode::OK, Json(registration)).into_response(),
        Err(e) => e.into_response(),
    }
}
