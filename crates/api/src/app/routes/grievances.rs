use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use egov_core::GrievanceId;
use egov_portal::{GrievanceUpdate, NewGrievance};

use crate::app::dto::{self, Items, UpdateGrievanceStatusRequest};
use crate::app::services::PortalServices;
use crate::context::ViewContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_grievances).post(submit_grievance))
}

pub fn admin_router() -> Router {
    Router::new()
        .route("/", get(list_all_grievances))
        .route("/:id/status", post(update_grievance_status))
}

pub async fn list_grievances(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(Items::from(services.list_grievances(&ctx).await))
}

pub async fn submit_grievance(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Json(body): Json<NewGrievance>,
) -> axum::response::Response {
    match services.submit_grievance(&ctx, body).await {
        Ok(grievance) => (StatusCode::CREATED, Json(grievance)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_all_grievances(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(Items::from(services.all_grievances(&ctx).await))
}

pub async fn update_grievance_status(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateGrievanceStatusRequest>,
) -> axum::response::Response {
    let id: GrievanceId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let update = GrievanceUpdate::new(body.status, body.admin_response, Utc::now());
    match services.update_grievance(&ctx, id, update).await {
        Ok(grievance) => (StatusCode::OK, Json(grievance)).into_response(),
        Err(e) => e.into_response(),
    }
}
