use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, warn};

use crate::journal::{JournalError, JournalRecord, NewJournalRecord, OrderJournal};
use crate::time::now_utc;

/// Default channel capacity between request handlers and the background
/// writer. Sized generously; once full, `record` drops the entry rather
/// than applying backpressure to the caller.
const CHANNEL_CAPACITY: usize = 1_024;

pub struct SqlxOrderJournal {
    pool: AnyPool,
    tx: Sender<NewJournalRecord>,
}

impl SqlxOrderJournal {
    /// Builds a journal and spawns its background writer task. The returned
    /// `JoinHandle` is intentionally dropped by callers that don't need to
    /// wait for shutdown; the worker exits cleanly once every sender clone
    /// (including this one) is dropped and the channel drains.
    pub fn new(pool: AnyPool) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let worker_pool = pool.clone();
        tokio::spawn(run_worker(worker_pool, rx));
        Self { pool, tx }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

async fn run_worker(pool: AnyPool, mut rx: Receiver<NewJournalRecord>) {
    debug!(component = "journal_worker", "background writer started");

    while let Some(record) = rx.recv().await {
        if let Err(e) = write_record(&pool, &record).await {
            error!(
                component = "journal_worker",
                order_id = %record.order_id,
                error = %e,
                "failed to persist journal record"
            );
        }
    }

    warn!(component = "journal_worker", "channel closed; worker exiting");
}

async fn write_record(pool: &AnyPool, record: &NewJournalRecord) -> anyhow::Result<()> {
    let packs_json = serde_json::to_string(&record.packs)?;
    sqlx::query(
        r#"
INSERT INTO orders (order_id, amount, total_items, total_packs, packs_json, cache_hit, created_ms)
VALUES (?, ?, ?, ?, ?, ?, ?);
"#,
    )
    .bind(&record.order_id)
    .bind(record.amount as i64)
    .bind(record.total_items as i64)
    .bind(record.total_packs as i64)
    .bind(packs_json)
    .bind(record.cache_hit)
    .bind(crate::time::now_ms() as i64)
    .execute(pool)
    .await?;
    Ok(())
}

fn backend_err(e: sqlx::Error) -> JournalError {
    JournalError::Backend(e.to_string())
}

#[async_trait]
impl OrderJournal for SqlxOrderJournal {
    fn record(&self, record: NewJournalRecord) {
        if self.tx.try_send(record).is_err() {
            warn!(
                component = "journal",
                "channel full or closed; dropping journal record"
            );
        }
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<JournalRecord>, JournalError> {
        let rows = sqlx::query(
            r#"
SELECT order_id, amount, total_items, total_packs, packs_json, cache_hit, created_ms
FROM orders
ORDER BY created_ms DESC
LIMIT ? OFFSET ?;
"#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let order_id: String = r.try_get("order_id").map_err(backend_err)?;
            let amount: i64 = r.try_get("amount").map_err(backend_err)?;
            let total_items: i64 = r.try_get("total_items").map_err(backend_err)?;
            let total_packs: i64 = r.try_get("total_packs").map_err(backend_err)?;
            let packs_json: String = r.try_get("packs_json").map_err(backend_err)?;
            let cache_hit: bool = r.try_get("cache_hit").map_err(backend_err)?;
            let created_ms: i64 = r.try_get("created_ms").map_err(backend_err)?;

            let packs: BTreeMap<u64, u64> = serde_json::from_str(&packs_json)
                .map_err(|e| JournalError::Backend(e.to_string()))?;

            out.push(JournalRecord {
                order_id,
                amount: amount as u64,
                total_items: total_items as u64,
                total_packs: total_packs as u64,
                packs,
                cache_hit,
                created_at: chrono::DateTime::from_timestamp_millis(created_ms)
                    .unwrap_or_else(now_utc),
            });
        }
        Ok(out)
    }
}
