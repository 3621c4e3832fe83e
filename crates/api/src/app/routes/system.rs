use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
};
use serde_json::json;

use egov_auth::UNAUTHENTICATED_ENTRY_VIEW;

use crate::app::services::PortalServices;
use crate::context::ViewContext;
use crate::middleware::optional_bearer;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Landing view. A live session skips straight to the dashboard.
pub async fn landing(
    Extension(services): Extension<Arc<PortalServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    match services.identity().session(optional_bearer(&headers)).await {
        Ok(Some(_)) => return Redirect::to("/dashboard").into_response(),
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "landing: no usable session"),
    }

    Json(json!({
        "view": "landing",
        "title": "E-Grampanchayat",
        "links": [
            { "label": "Citizen Portal", "path": UNAUTHENTICATED_ENTRY_VIEW },
            { "label": "Admin", "path": "/admin/login" },
        ],
    }))
    .into_response()
}

pub async fn auth_entry() -> impl IntoResponse {
    Json(json!({
        "view": "auth",
        "message": "Sign in with your identity provider and present the bearer token.",
    }))
}

pub async fn admin_login() -> impl IntoResponse {
    Json(json!({
        "view": "admin_login",
        "message": "Administrator sign-in. Access is granted by an admin role assignment.",
    }))
}

pub async fn nav(Extension(ctx): Extension<ViewContext>) -> impl IntoResponse {
    Json(ctx.variant().menu())
}
