pub mod errors;
pub mod handlers;
pub mod logging;

use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use self::handlers::AppState;

/// Build the axum router: liveness, the two proxy endpoints, permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/gemini_proxy", post(handlers::gemini_proxy))
        .route("/api/sarasina", post(handlers::sarasina_proxy))
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .layer(cors_layer())
        .with_state(Arc::new(state))
}

/// Any origin, method and header, with credentials. Wildcards are not allowed
/// alongside credentials, so the request's own values are mirrored back.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
