use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::dto::DashboardView;
use crate::app::services::PortalServices;
use crate::context::ViewContext;

pub async fn citizen_dashboard(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(DashboardView {
        navigation: ctx.variant(),
        stats: services.citizen_dashboard(&ctx).await,
    })
}

pub async fn admin_dashboard(
    Extension(services): Extension<Arc<PortalServices>>,
    Extension(ctx): Extension<ViewContext>,
) -> impl IntoResponse {
    Json(DashboardView {
        navigation: ctx.variant(),
        stats: services.admin_dashboard(&ctx).await,
    })
}
