use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use crate::app::dto::Items;
use crate::app::routes::{announcements, certificates, dashboard, grievances, property_tax};
use crate::app::services::PortalServices;
use crate::context::ViewContext;

/// Administrator views. Reaching them only requires a principal; what they
/// show and allow is decided by the store's access policy.
pub fn router() -> Router {
    Router::new()
        .route("/", get(dashboard::admin_dashboard))
        .route("/users", get(list_users))
        .nest("/certificates", certificates::admin_router())
        .nest("/property-tax", property_tax::admin_router())
        .nest("/grievances", grievances::admin_router())
        .nest("/announcements", announcements::admin_router())
}

pub async fn list_users(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(Items::from(services.list_users(&ctx).await))
}
