use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::services::PortalGate;
use crate::context::ViewContext;

/// Access gate for protected views.
///
/// Anonymous or unverifiable requests are redirected to the entry view and
/// never reach the handler. Authorized requests get a [`ViewContext`] with the
/// best-effort navigation variant.
pub async fn gate_middleware(
    State(gate): State<Arc<PortalGate>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = optional_bearer(req.headers()).map(str::to_owned);
    let path = req.uri().path().to_owned();
    let gate_ref = &*gate;

    let outcome = gate_ref
        .guard(token.as_deref(), |principal| async move {
            let variant = gate_ref.navigation_variant(&principal).await;
            req.extensions_mut()
                .insert(ViewContext::new(principal, variant));
            next.run(req).await
        })
        .await;

    match outcome {
        Ok(response) => response,
        Err(denied) => {
            tracing::debug!(
                path = %path,
                redirect_to = denied.redirect_to,
                "unauthenticated navigation redirected"
            );
            Redirect::to(denied.redirect_to).into_response()
        }
    }
}

/// Bearer credential, if one was presented. Malformed headers count as none.
pub fn optional_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
