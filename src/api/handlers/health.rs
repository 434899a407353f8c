use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::api::AppState;

#[derive(Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub size: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: CacheStatsResponse,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.coordinator.cache_stats();
    Json(HealthResponse {
        status: "healthy",
        cache: CacheStatsResponse {
            hits: stats.hits,
            misses: stats.misses,
            hit_ratio: stats.hit_ratio(),
            size: stats.size,
        },
    })
}
