use async_trait::async_trait;
use sqlx::{AnyPool, Row};

use crate::store::{PackSizeRecord, PackStore, StoreError};
use crate::time::now_ms;

/// SQLx-backed implementation of `PackStore`. Responsible only for
/// persistence and row mapping; caching and invalidation live one layer up
/// in the coordinator.
pub struct SqlxPackStore {
    pool: AnyPool,
}

impl SqlxPackStore {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl PackStore for SqlxPackStore {
    async fn list(&self) -> Result<Vec<PackSizeRecord>, StoreError> {
        let rows = sqlx::query("SELECT size, created_ms FROM pack_sizes ORDER BY size ASC;")
            .fetch_all(&self.pool)
            .await
            .map_err(backend_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let size: i64 = r.try_get("size").map_err(backend_err)?;
            let created_ms: i64 = r.try_get("created_ms").map_err(backend_err)?;
            out.push(PackSizeRecord {
                size: size as u64,
                created_ms: created_ms as u64,
            });
        }
        Ok(out)
    }

    async fn add(&self, size: u64) -> Result<(), StoreError> {
        let res = sqlx::query("INSERT INTO pack_sizes (size, created_ms) VALUES (?, ?);")
            .bind(size as i64)
            .bind(now_ms() as i64)
            .execute(&self.pool)
            .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate(size))
            }
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn delete(&self, size: u64) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM pack_sizes WHERE size = ?;")
            .bind(size as i64)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(size));
        }
        Ok(())
    }
}
