use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use egov_portal::NewAnnouncement;

use crate::app::dto::Items;
use crate::app::services::PortalServices;
use crate::context::ViewContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_announcements))
}

pub fn admin_router() -> Router {
    Router::new().route("/", get(list_announcements).post(publish_announcement))
}

pub async fn list_announcements(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(Items::from(services.list_announcements(&ctx).await))
}

pub async fn publish_announcement(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Json(body): Json<NewAnnouncement>,
) -> axum::response::Response {
    match services.publish_announcement(&ctx, body).await {
        Ok(announcement) => (StatusCode::CREATED, Json(announcement)).into_response(),
        Err(e) => e.into_response(),
    }
}
