//! Glue between the pure solver, the result cache, and the durable
//! collaborators (`PackStore`, `OrderJournal`). Holds no business logic of
//! its own beyond ordering these calls correctly — in particular, it is the
//! single place that enforces "mutate PackStore, then clear the cache"
//! before the mutating call returns to its caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::{CachedSolution, ResultCache, build_key};
use crate::error::AppError;
use crate::journal::{JournalRecord, NewJournalRecord, OrderJournal};
use crate::logger::warn_if_slow;
use crate::solver::{PackSolver, Solution};
use crate::store::{PackSizeRecord, PackStore};

pub struct CoordinatorConfig {
    pub amount_max: u64,
    pub cache_ttl: Duration,
    pub order_history_default_limit: usize,
    pub order_history_max_limit: usize,
}

pub struct RequestCoordinator {
    store: Arc<dyn PackStore>,
    journal: Arc<dyn OrderJournal>,
    cache: Arc<ResultCache>,
    solver: PackSolver,
    config: CoordinatorConfig,
}

impl RequestCoordinator {
    pub fn new(
        store: Arc<dyn PackStore>,
        journal: Arc<dyn OrderJournal>,
        cache: Arc<ResultCache>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            store,
            journal,
            cache,
            solver: PackSolver::new(),
            config,
        }
    }

    #[instrument(skip(self), fields(amount))]
    pub async fn calculate(&self, amount: u64) -> Result<Solution, AppError> {
        if amount < 1 {
            return Err(AppError::InvalidAmount);
        }
        if amount > self.config.amount_max {
            return Err(AppError::AmountTooLarge);
        }

        let records = warn_if_slow(
            "store_list_pack_sizes",
            Duration::from_millis(50),
            self.store.list(),
        )
        .await?;
        if records.is_empty() {
            return Err(AppError::NoConfig);
        }
        let sizes: Vec<u64> = records.iter().map(|r| r.size).collect();

        let key = build_key(amount, &sizes);

        let (solution, cache_hit) = match self.cache.get(&key).value {
            Some(cached) => {
                let total_packs = Solution::total_packs_of(&cached.packs);
                (
                    Solution {
                        packs: cached.packs,
                        total_items: cached.total_items,
                        total_packs,
                    },
                    true,
                )
            }
            None => {
                let solution = self.solver.solve(amount, &sizes)?;
                self.cache.set(
                    &key,
                    CachedSolution::from(&solution),
                    self.config.cache_ttl,
                );
                (solution, false)
            }
        };

        self.journal.record(NewJournalRecord {
            order_id: Uuid::new_v4().to_string(),
            amount,
            total_items: solution.total_items,
            total_packs: solution.total_packs,
            packs: solution.packs.clone(),
            cache_hit,
        });

        Ok(solution)
    }

    #[instrument(skip(self))]
    pub async fn add_pack_size(&self, size: u64) -> Result<(), AppError> {
        if size < 1 {
            return Err(AppError::InvalidPackSize);
        }
        self.store.add(size).await?;
        self.cache.clear();
        info!(size, "pack size added; cache cleared");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_pack_size(&self, size: u64) -> Result<(), AppError> {
        self.store.delete(size).await?;
        self.cache.clear();
        info!(size, "pack size deleted; cache cleared");
        Ok(())
    }

    pub async fn list_pack_sizes(&self) -> Result<Vec<PackSizeRecord>, AppError> {
        Ok(self.store.list().await?)
    }

    pub async fn list_orders(&self, limit: Option<usize>) -> Result<Vec<JournalRecord>, AppError> {
        let limit = limit
            .unwrap_or(self.config.order_history_default_limit)
            .min(self.config.order_history_max_limit);

        let records = self.journal.list(limit, 0).await.inspect_err(|e| {
            warn!(error = %e, "journal list failed");
        })?;
        Ok(records)
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalError;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;

    struct MockStore {
        sizes: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl PackStore for MockStore {
        async fn list(&self) -> Result<Vec<PackSizeRecord>, StoreError> {
            Ok(self
                .sizes
                .lock()
                .iter()
                .map(|&size| PackSizeRecord {
                    size,
                    created_ms: 0,
                })
                .collect())
        }

        async fn add(&self, size: u64) -> Result<(), StoreError> {
            let mut sizes = self.sizes.lock();
            if sizes.contains(&size) {
                return Err(StoreError::Duplicate(size));
            }
            sizes.push(size);
            Ok(())
        }

        async fn delete(&self, size: u64) -> Result<(), StoreError> {
            let mut sizes = self.sizes.lock();
            let before = sizes.len();
            sizes.retain(|&s| s != size);
            if sizes.len() == before {
                return Err(StoreError::NotFound(size));
            }
            Ok(())
        }
    }

    struct MockJournal {
        records: Mutex<Vec<NewJournalRecord>>,
    }

    #[async_trait]
    impl OrderJournal for MockJournal {
        fn record(&self, record: NewJournalRecord) {
            self.records.lock().push(record);
        }

        async fn list(&self, limit: usize, _offset: usize) -> Result<Vec<JournalRecord>, JournalError> {
            Ok(self
                .records
                .lock()
                .iter()
                .rev()
                .take(limit)
                .map(|r| JournalRecord {
                    order_id: r.order_id.clone(),
                    amount: r.amount,
                    total_items: r.total_items,
                    total_packs: r.total_packs,
                    packs: r.packs.clone(),
                    cache_hit: r.cache_hit,
                    created_at: crate::time::now_utc(),
                })
                .collect())
        }
    }

    fn coordinator(sizes: Vec<u64>) -> RequestCoordinator {
        RequestCoordinator::new(
            Arc::new(MockStore {
                sizes: Mutex::new(sizes),
            }),
            Arc::new(MockJournal {
                records: Mutex::new(Vec::new()),
            }),
            Arc::new(ResultCache::new(100)),
            CoordinatorConfig {
                amount_max: 10_000_000,
                cache_ttl: Duration::from_secs(3600),
                order_history_default_limit: 100,
                order_history_max_limit: 1000,
            },
        )
    }

    #[tokio::test]
    async fn calculate_rejects_zero_amount() {
        let c = coordinator(vec![250, 500]);
        assert!(matches!(
            c.calculate(0).await,
            Err(AppError::InvalidAmount)
        ));
    }

    #[tokio::test]
    async fn calculate_rejects_amount_too_large() {
        let c = coordinator(vec![250, 500]);
        assert!(matches!(
            c.calculate(20_000_000).await,
            Err(AppError::AmountTooLarge)
        ));
    }

    #[tokio::test]
    async fn calculate_rejects_empty_config() {
        let c = coordinator(vec![]);
        assert!(matches!(c.calculate(100).await, Err(AppError::NoConfig)));
    }

    #[tokio::test]
    async fn calculate_produces_expected_solution() {
        let c = coordinator(vec![250, 500, 1000, 2000, 5000]);
        let s = c.calculate(251).await.unwrap();
        assert_eq!(s.total_items, 500);
        assert_eq!(s.total_packs, 1);
        assert_eq!(s.packs, BTreeMap::from([(500, 1)]));
    }

    #[tokio::test]
    async fn second_identical_call_is_a_cache_hit() {
        let c = coordinator(vec![250, 500, 1000, 2000, 5000]);
        c.calculate(251).await.unwrap();
        c.calculate(251).await.unwrap();

        let stats = c.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn adding_pack_size_invalidates_cache() {
        let c = coordinator(vec![250, 500]);
        c.calculate(251).await.unwrap();
        assert_eq!(c.cache_stats().size, 1);

        c.add_pack_size(1000).await.unwrap();
        assert_eq!(c.cache_stats().size, 0);

        // previously-cached amount now must be recomputed (miss) with new config
        let s = c.calculate(251).await.unwrap();
        assert_eq!(s.total_items, 500); // unaffected by the larger pack here
        assert_eq!(c.cache_stats().misses, 2);
    }

    #[tokio::test]
    async fn deleting_pack_size_invalidates_cache() {
        let c = coordinator(vec![250, 500]);
        c.calculate(251).await.unwrap();
        c.delete_pack_size(500).await.unwrap();
        assert_eq!(c.cache_stats().size, 0);

        let s = c.calculate(251).await.unwrap();
        assert_eq!(s.total_items, 500); // 250*2, since 500 was removed
        assert_eq!(s.packs, BTreeMap::from([(250, 2)]));
    }

    #[tokio::test]
    async fn adding_duplicate_pack_size_is_rejected() {
        let c = coordinator(vec![250]);
        assert!(matches!(
            c.add_pack_size(250).await,
            Err(AppError::DuplicatePackSize(250))
        ));
    }

    #[tokio::test]
    async fn deleting_unknown_pack_size_is_rejected() {
        let c = coordinator(vec![250]);
        assert!(matches!(
            c.delete_pack_size(999).await,
            Err(AppError::UnknownPackSize(999))
        ));
    }

    #[tokio::test]
    async fn list_orders_clamps_to_max_limit() {
        let c = coordinator(vec![250]);
        for _ in 0..5 {
            c.calculate(250).await.unwrap();
        }
        let orders = c.list_orders(Some(1_000_000)).await.unwrap();
        assert!(orders.len() <= c.config.order_history_max_limit);
    }
}
