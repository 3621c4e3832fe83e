use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod announcements;
pub mod certificates;
pub mod dashboard;
pub mod grievances;
pub mod profile;
pub mod property_tax;
pub mod system;

/// Entry views and health; reachable without a principal.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::landing))
        .route("/auth", get(system::auth_entry))
        .route("/admin/login", get(system::admin_login))
        .route("/health", get(system::health))
}

/// Router for all protected views.
pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard::citizen_dashboard))
        .route("/nav", get(system::nav))
        .route("/register", post(profile::register))
        .route("/profile", get(profile::get_profile).patch(profile::update_profile))
        .nest("/certificates", certificates::router())
        .nest("/property-tax", property_tax::router())
        .nest("/grievances", grievances::router())
        .nest("/announcements", announcements::router())
        .nest("/admin", admin::router())
}
