use axum::{Json, extract::Path, http::StatusCode, response::IntoResponse};
use serde_json::json;

use rolegate_auth::{ClaimField, IdentityClaims};

use crate::app::errors;
use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(user: CurrentUser) -> Json<IdentityClaims> {
    Json(IdentityClaims::clone(&user))
}

pub async fn whoami_field(user: CurrentUser, Path(field): Path<String>) -> axum::response::Response {
    match field.parse::<ClaimField>() {
        Ok(field) => Json(json!({
            "field": field.as_str(),
            "value": user.claim(field),
        }))
        .into_response(),
        Err(e) => errors::json_error(StatusCode::NOT_FOUND, "UNKNOWN_CLAIM", e.to_string()),
    }
}

pub async fn public_notes(user: CurrentUser) -> impl IntoResponse {
    Json(json!({
        "viewer": user.subject(),
        "notes": ["release train departs friday", "staging is frozen"],
    }))
}
