use std::time::Duration;

/// Service configuration, read once at startup.
///
/// Mirrors the source layout of `AppConfig::from_env` in the teacher crate:
/// every knob has a hard-coded default and an environment variable override.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    pub port: u16,

    /// Database connection string (sqlite or postgres, via `sqlx::Any`).
    pub database_url: String,

    // =========================
    // Result cache configuration
    // =========================
    /// Maximum number of entries held in the in-memory LRU result cache.
    pub cache_max_size: usize,

    /// Time-to-live applied to every cache entry at insertion.
    pub cache_ttl: Duration,

    // =========================
    // Request validation
    // =========================
    /// Largest order amount accepted by `/api/calculate`.
    pub amount_max: u64,

    // =========================
    // Order history
    // =========================
    pub order_history_default_limit: usize,
    pub order_history_max_limit: usize,

    // =========================
    // Rate limiting
    // =========================
    /// Refill interval for one token (default: 1 token / 100ms).
    pub rate_limit_interval: Duration,
    /// Maximum burst size per client identity.
    pub rate_limit_burst: u32,

    // =========================
    // Write authentication
    // =========================
    /// When set, POST/DELETE on `/api/packs*` require this value in
    /// `X-API-Key` or the `api_key` query parameter.
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

        Self {
            port: env_parsed("PORT", 8080),
            database_url,

            cache_max_size: env_parsed("CACHE_MAX_SIZE", 1_000),
            cache_ttl: Duration::from_secs(env_parsed("CACHE_TTL_SECONDS", 3_600)),

            amount_max: env_parsed("AMOUNT_MAX", 10_000_000),

            order_history_default_limit: env_parsed("ORDER_HISTORY_DEFAULT_LIMIT", 100),
            order_history_max_limit: env_parsed("ORDER_HISTORY_MAX_LIMIT", 1_000),

            rate_limit_interval: Duration::from_millis(env_parsed("RATE_LIMIT_INTERVAL_MS", 100)),
            rate_limit_burst: env_parsed("RATE_LIMIT_BURST", 20),

            api_key: std::env::var("API_KEY").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Parses an environment variable into `T`, falling back to `default` when
/// the variable is unset or fails to parse.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
