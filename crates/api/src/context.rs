use std::ops::Deref;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use rolegate_auth::{AuthFailure, IdentityClaims, RequestContext};

use crate::app::errors::auth_failure_to_response;

/// Authenticated identity of the current request.
///
/// Reads the [`RequestContext`] placed in request extensions by
/// [`auth_middleware`](crate::middleware::auth_middleware). Routes outside that
/// middleware reject with the `NotAuthenticated` response.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<IdentityClaims>);

impl Deref for CurrentUser {
    type Target = IdentityClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(RequestContext::identity_arc)
            .map(CurrentUser)
            .ok_or_else(|| auth_failure_to_response(AuthFailure::NotAuthenticated))
    }
}
