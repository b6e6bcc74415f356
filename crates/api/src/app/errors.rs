use axum::http::StatusCode;
use axum::response::IntoResponse;

use rolegate_auth::{AuthFailure, ErrorBody};

/// Render an authentication/authorization failure as `{statusCode, error, message}`.
pub fn auth_failure_to_response(err: AuthFailure) -> axum::response::Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::FORBIDDEN);
    json_error(status, err.error_code(), err.detail())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(ErrorBody {
            status_code: status.as_u16(),
            error: code.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}
