//! Administrative endpoints.
//!
//! The group requires `ANY_OF[admin, moderator]`; `/system` declares its own
//! requirement, which replaces the group's rather than stacking on it.

use axum::{Json, Router, response::IntoResponse, routing::{MethodRouter, get}};
use serde_json::json;

use rolegate_auth::{Role, RoleRequirement};

use crate::context::CurrentUser;
use crate::middleware::guarded;

pub fn group_requirement() -> RoleRequirement {
    RoleRequirement::any_of(["admin", "moderator"])
}

pub fn system_requirement() -> RoleRequirement {
    RoleRequirement::all_of(["superuser", "operator"])
}

pub fn router() -> Router {
    let group = group_requirement();

    Router::new()
        .route("/dashboard", protect(get(dashboard), &group, None))
        .route(
            "/system",
            protect(get(system), &group, Some(&system_requirement())),
        )
}

fn protect(
    route: MethodRouter,
    group: &RoleRequirement,
    operation: Option<&RoleRequirement>,
) -> MethodRouter {
    match RoleRequirement::most_specific(Some(group), operation) {
        Some(requirement) => guarded(route, requirement.clone()),
        None => route,
    }
}

async fn dashboard(user: CurrentUser) -> impl IntoResponse {
    Json(json!({
        "area": "dashboard",
        "subject": user.subject(),
        "roles": user.roles().iter().map(Role::as_str).collect::<Vec<_>>(),
    }))
}

async fn system(user: CurrentUser) -> impl IntoResponse {
    Json(json!({
        "area": "system",
        "subject": user.subject(),
    }))
}
