//! Failure taxonomy for authentication and authorization.

use serde::Serialize;
use thiserror::Error;

use crate::{RequirementMode, Role};

/// Why a bearer token (or the header carrying it) was rejected.
///
/// Every variant maps to the same external `401 INVALID_TOKEN`; the reason is
/// kept for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenInvalidReason {
    MissingHeader,
    BadScheme,
    EmptyToken,
    Structure,
    Encoding,
    PayloadShape,
    MissingSub,
    MissingEmail,
}

impl TokenInvalidReason {
    /// Stable machine-readable code (e.g. `missing-sub`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenInvalidReason::MissingHeader => "missing-header",
            TokenInvalidReason::BadScheme => "bad-scheme",
            TokenInvalidReason::EmptyToken => "empty-token",
            TokenInvalidReason::Structure => "structure",
            TokenInvalidReason::Encoding => "encoding",
            TokenInvalidReason::PayloadShape => "payload-shape",
            TokenInvalidReason::MissingSub => "missing-sub",
            TokenInvalidReason::MissingEmail => "missing-email",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            TokenInvalidReason::MissingHeader => "authorization header is missing",
            TokenInvalidReason::BadScheme => "authorization header must use the Bearer scheme",
            TokenInvalidReason::EmptyToken => "bearer token is empty",
            TokenInvalidReason::Structure => "token must have exactly three dot-separated segments",
            TokenInvalidReason::Encoding => "token payload is not valid base64url-encoded UTF-8",
            TokenInvalidReason::PayloadShape => "token payload is not a JSON object",
            TokenInvalidReason::MissingSub => "token payload has no usable 'sub' claim",
            TokenInvalidReason::MissingEmail => "token payload has no usable 'email' claim",
        }
    }
}

impl core::fmt::Display for TokenInvalidReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of the authentication/authorization pipeline.
///
/// Never carries the raw token or claim values other than role labels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("invalid token ({reason})")]
    TokenInvalid { reason: TokenInvalidReason },

    /// Authorization ran without a prior successful authentication. This is a
    /// wiring defect in the caller, never "a user with no roles".
    #[error("request is not authenticated")]
    NotAuthenticated,

    #[error("insufficient roles for {mode} requirement")]
    InsufficientRoles {
        mode: RequirementMode,
        required: Vec<Role>,
        missing: Vec<Role>,
    },
}

impl AuthFailure {
    pub fn token_invalid(reason: TokenInvalidReason) -> Self {
        Self::TokenInvalid { reason }
    }

    /// HTTP status the surrounding framework should render.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthFailure::TokenInvalid { .. } => 401,
            AuthFailure::NotAuthenticated | AuthFailure::InsufficientRoles { .. } => 403,
        }
    }

    /// Short machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthFailure::TokenInvalid { .. } => "INVALID_TOKEN",
            AuthFailure::NotAuthenticated | AuthFailure::InsufficientRoles { .. } => {
                "INSUFFICIENT_PERMISSIONS"
            }
        }
    }

    /// Human-readable detail.
    pub fn detail(&self) -> String {
        match self {
            AuthFailure::TokenInvalid { reason } => {
                format!("Invalid token: {}", reason.describe())
            }
            AuthFailure::NotAuthenticated => {
                "Authentication is required before authorization".to_string()
            }
            AuthFailure::InsufficientRoles { mode, required, missing } => match mode {
                RequirementMode::AnyOf => {
                    format!("Requires one of the roles: {}", join(required))
                }
                RequirementMode::AllOf => {
                    format!("Missing required roles: {}", join(missing))
                }
            },
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            status_code: self.status_code(),
            error: self.error_code().to_string(),
            message: self.detail(),
        }
    }
}

/// Structured error object rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

fn join(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}
