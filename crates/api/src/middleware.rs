use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};
use tracing::Instrument;
use uuid::Uuid;

use rolegate_auth::{
    AuthFailure, ClaimsDecoder, RequestAuthenticator, RequestContext, RoleRequirement,
    TokenInvalidReason, authorize,
};

use crate::app::errors::auth_failure_to_response;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: RequestAuthenticator,
}

impl AuthState {
    pub fn new(decoder: Arc<dyn ClaimsDecoder>) -> Self {
        Self {
            authenticator: RequestAuthenticator::new(decoder),
        }
    }
}

/// Run the request inside a span carrying method, path and a request id, so
/// every authentication/authorization event is attributable.
pub async fn request_span(req: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %Uuid::now_v7(),
    );

    next.run(req).instrument(span).await
}

/// Authenticate the bearer header and attach a fresh [`RequestContext`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = match req.headers().get(AUTHORIZATION).map(|v| v.to_str()) {
        None => None,
        Some(Ok(value)) => Some(value),
        // Not representable as text, so it cannot start with the Bearer prefix.
        Some(Err(_)) => {
            tracing::warn!(reason = %TokenInvalidReason::BadScheme, "authentication failed");
            return auth_failure_to_response(AuthFailure::token_invalid(
                TokenInvalidReason::BadScheme,
            ));
        }
    };

    let mut ctx = RequestContext::new();
    if let Err(err) = state.authenticator.authenticate(&mut ctx, header) {
        return auth_failure_to_response(err);
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Enforce `requirement` against the request's authenticated identity.
pub async fn require_roles(
    State(requirement): State<RoleRequirement>,
    req: Request,
    next: Next,
) -> Response {
    let outcome = match req.extensions().get::<RequestContext>() {
        Some(ctx) => authorize(ctx, &requirement),
        None => authorize(&RequestContext::new(), &requirement),
    };

    match outcome {
        Ok(_) => next.run(req).await,
        Err(err) => auth_failure_to_response(err),
    }
}

/// Attach a role requirement to a single route.
pub fn guarded(route: MethodRouter, requirement: RoleRequirement) -> MethodRouter {
    route.route_layer(axum::middleware::from_fn_with_state(requirement, require_roles))
}
