//! Fire-and-forget order journal.
//!
//! `OrderJournal::record` must never block or fail the calling request: it
//! hands the record to a bounded channel and returns immediately. A single
//! background task drains the channel and writes to the durable store. If
//! the channel is full the record is dropped and a warning is logged —
//! journaling is best-effort by design, never a availability dependency for
//! the calculate path.

pub mod sqlx_journal;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

pub use sqlx_journal::SqlxOrderJournal;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("journal backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalRecord {
    pub order_id: String,
    pub amount: u64,
    pub total_items: u64,
    pub total_packs: u64,
    pub packs: BTreeMap<u64, u64>,
    pub cache_hit: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewJournalRecord {
    pub order_id: String,
    pub amount: u64,
    pub total_items: u64,
    pub total_packs: u64,
    pub packs: BTreeMap<u64, u64>,
    pub cache_hit: bool,
}

#[async_trait]
pub trait OrderJournal: Send + Sync {
    /// Queues `record` for durable storage. Returns immediately once queued;
    /// does not wait for the write to land.
    fn record(&self, record: NewJournalRecord);

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<JournalRecord>, JournalError>;
}
