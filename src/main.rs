use std::sync::Arc;

use packshipper::api::{self, AppState};
use packshipper::cache::ResultCache;
use packshipper::config::AppConfig;
use packshipper::coordinator::{CoordinatorConfig, RequestCoordinator};
use packshipper::db::Db;
use packshipper::journal::SqlxOrderJournal;
use packshipper::logger::init_tracing;
use packshipper::ratelimit::RateLimiter;
use packshipper::store::SqlxPackStore;

async fn init_coordinator(cfg: &AppConfig) -> anyhow::Result<Arc<RequestCoordinator>> {
    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;

    let store = Arc::new(SqlxPackStore::new((*db.pool).clone()));
    let journal = Arc::new(SqlxOrderJournal::new((*db.pool).clone()));
    let cache = Arc::new(ResultCache::new(cfg.cache_max_size));

    Ok(Arc::new(RequestCoordinator::new(
        store,
        journal,
        cache,
        CoordinatorConfig {
            amount_max: cfg.amount_max,
            cache_ttl: cfg.cache_ttl,
            order_history_default_limit: cfg.order_history_default_limit,
            order_history_max_limit: cfg.order_history_max_limit,
        },
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sqlx::any::install_default_drivers();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("starting packshipper service");

    let cfg = AppConfig::from_env();
    let port = cfg.port;

    let coordinator = init_coordinator(&cfg).await?;
    let rate_limiter = Arc::new(RateLimiter::new(cfg.rate_limit_burst, cfg.rate_limit_interval));

    let state = AppState {
        coordinator,
        rate_limiter,
        api_key: cfg.api_key.clone().map(Arc::new),
    };

    let router = api::build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    })
    .await?;

    Ok(())
}
