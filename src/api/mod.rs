pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderName;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::coordinator::RequestCoordinator;
use crate::ratelimit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RequestCoordinator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub api_key: Option<Arc<String>>,
}

pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let write_routes = Router::new()
        .route("/api/packs", post(handlers::packs::create_pack))
        .route("/api/packs/{size}", delete(handlers::packs::delete_pack))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_api_key));

    let read_routes = Router::new()
        .route("/api/calculate", post(handlers::calculate::post_calculate))
        .route("/api/packs", get(handlers::packs::list_packs))
        .route("/api/orders", get(handlers::orders::list_orders))
        .route("/health", get(handlers::health::health));

    Router::new()
        .merge(read_routes)
        .merge(write_routes)
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit::enforce))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}
