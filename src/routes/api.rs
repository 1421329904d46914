use axum::{
    Router,
    http::{
        HeaderValue,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    routing::{get, options},
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::handlers::{api, test_call};
use crate::state::AppState;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

/// Create the test call router
///
/// `OPTIONS /test-call` answers the CORS pre-flight; every other method runs
/// the call flow. Browser clients call this directly, so every response,
/// errors included, carries permissive CORS headers. `CorsLayer` is not used
/// because it answers pre-flights itself and only when `Origin` is present.
pub fn create_test_call_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/test-call",
            options(test_call::test_call_preflight).fallback(test_call::initiate_test_call),
        )
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Create the public router (health check, no CORS)
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(api::health_check))
}

/// Full application router with state attached
pub fn create_app(state: Arc<AppState>) -> Router {
    create_public_router()
        .merge(create_test_call_router())
        .with_state(state)
}
