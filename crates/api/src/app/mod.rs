//! HTTP application wiring (Axum router + middleware stack).
//!
//! - `routes/`: handlers and per-route role requirements
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Router, routing::get};
use tower::ServiceBuilder;

use rolegate_auth::{ClaimsDecoder, UnsignedClaimsCodec};

use crate::middleware;

pub mod errors;
pub mod routes;

/// Build the full HTTP router with the unsigned claims codec.
pub fn build_app() -> Router {
    build_app_with(Arc::new(UnsignedClaimsCodec::new()))
}

/// Build the router around a specific claims decoder.
pub fn build_app_with(decoder: Arc<dyn ClaimsDecoder>) -> Router {
    let auth_state = middleware::AuthState::new(decoder);

    // Protected routes: every request must carry a decodable bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_span)))
}
