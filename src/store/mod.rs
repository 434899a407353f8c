pub mod sqlx_store;

use async_trait::async_trait;
use thiserror::Error;

pub use sqlx_store::SqlxPackStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("pack size {0} already exists")]
    Duplicate(u64),
    #[error("pack size {0} is not configured")]
    NotFound(u64),
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackSizeRecord {
    pub size: u64,
    pub created_ms: u64,
}

/// Durable store for the set of configured pack sizes.
///
/// Every mutating method is expected, by contract with `RequestCoordinator`,
/// to leave the `ResultCache` cleared by the time it returns — the store
/// itself has no cache reference and does not enforce this; the coordinator
/// does, by always invalidating before delegating here.
#[async_trait]
pub trait PackStore: Send + Sync {
    async fn list(&self) -> Result<Vec<PackSizeRecord>, StoreError>;
    async fn add(&self, size: u64) -> Result<(), StoreError>;
    async fn delete(&self, size: u64) -> Result<(), StoreError>;
}
