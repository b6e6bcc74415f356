use axum::{Router, routing::get};

use rolegate_auth::RoleRequirement;

use crate::middleware::guarded;

pub mod admin;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/whoami/:field", get(system::whoami_field))
        .route(
            "/public-notes",
            guarded(get(system::public_notes), RoleRequirement::unrestricted()),
        )
        .nest("/admin", admin::router())
}
