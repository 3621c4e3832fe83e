use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use egov_core::CertificateId;
use egov_portal::Review;

use crate::app::dto::{self, ApplyCertificateRequest, Items, RejectCertificateRequest};
use crate::app::services::PortalServices;
use crate::context::ViewContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_certificates).post(apply_certificate))
}

pub fn admin_router() -> Router {
    Router::new()
        .route("/", get(list_all_certificates))
        .route("/:id/approve", post(approve_certificate))
        .route("/:id/reject", post(reject_certificate))
}

pub async fn list_certificates(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(Items::from(services.list_certificates(&ctx).await))
}

pub async fn apply_certificate(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Json(body): Json<ApplyCertificateRequest>,
) -> axum::response::Response {
    match services.apply_certificate(&ctx, body.into()).await {
        Ok(certificate) => (StatusCode::CREATED, Json(certificate)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_all_certificates(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(Items::from(services.all_certificates(&ctx).await))
}

pub async fn approve_certificate(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    review(services, ctx, id, Review::Approve).await
}

pub async fn reject_certificate(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Path(id): Path<String>,
    body: Option<Json<RejectCertificateRequest>>,
) -> axum::response::Response {
    let remarks = body.and_then(|Json(b)| b.remarks);
    review(services, ctx, id, Review::Reject { remarks }).await
}

async fn review(
    services: Arc<PortalServices>,
    ctx: ViewContext,
    id: String,
    review: Review,
) -> axum::response::Response {
    let id: CertificateId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match services.review_certificate(&ctx, id, review).await {
        Ok(certificate) => (StatusCode::OK, Json(certificate)).into_response(),
        Err(e) => e.into_response(),
    }
}
