use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use egov_core::PropertyTaxId;
use egov_portal::NewPropertyTax;

use crate::app::dto::{self, AdminTaxView, CitizenTaxView};
use crate::app::services::PortalServices;
use crate::context::ViewContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_property_tax))
        .route("/:id/pay", post(pay_property_tax))
}

pub fn admin_router() -> Router {
    Router::new().route("/", get(list_all_property_tax).post(assess_property_tax))
}

pub async fn list_property_tax(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    let (items, summary) = services.list_property_tax(&ctx).await;
    Json(CitizenTaxView { items, summary })
}

pub async fn pay_property_tax(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PropertyTaxId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match services.pay_property_tax(&ctx, id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_all_property_tax(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    let (items, stats) = services.all_property_tax(&ctx).await;
    Json(AdminTaxView { items, stats })
}

pub async fn assess_property_tax(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
    Json(body): Json<NewPropertyTax>,
) -> axum::response::Response {
    match services.assess_property_tax(&ctx, body).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}
