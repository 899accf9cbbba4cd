// Record store for keywords, the tracking config, and rank observations.
//
// RankStore is the only persistence seam. PgRankStore backs production,
// MemoryStore backs tests and local runs without a database.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgRankStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use rankwatch_common::{Keyword, Observation, TrackingConfig};

use crate::error::StoreResult;

#[async_trait]
pub trait RankStore: Send + Sync {
    // --- Keywords ---

    /// All keywords, ordered by term.
    async fn list_keywords(&self) -> StoreResult<Vec<Keyword>>;

    async fn find_keyword(&self, id: Uuid) -> StoreResult<Option<Keyword>>;

    /// Add a keyword. The term is trimmed; duplicates are rejected.
    async fn insert_keyword(&self, term: &str) -> StoreResult<Keyword>;

    /// Delete a keyword and all of its observations. Returns false if it didn't exist.
    async fn delete_keyword(&self, id: Uuid) -> StoreResult<bool>;

    // --- Tracking config (singleton) ---

    async fn tracking_config(&self) -> StoreResult<Option<TrackingConfig>>;

    async fn save_tracking_config(&self, config: &TrackingConfig) -> StoreResult<TrackingConfig>;

    // --- Observations ---

    /// Unordered bulk insert. Invalid records are rejected one by one and
    /// reported; the rest are stored.
    async fn insert_observations(&self, observations: &[Observation]) -> StoreResult<InsertReport>;

    /// Up to `per_url` newest observations of each URL for a keyword, newest first.
    async fn recent_observations(&self, keyword_id: Uuid, per_url: usize)
        -> StoreResult<Vec<Observation>>;

    /// Newest check date across all observations.
    async fn latest_check_date(&self) -> StoreResult<Option<DateTime<Utc>>>;
}

/// Outcome of a bulk observation insert.
#[derive(Debug, Default)]
pub struct InsertReport {
    pub inserted: usize,
    pub rejected: Vec<RejectedObservation>,
}

#[derive(Debug, Clone)]
pub struct RejectedObservation {
    pub observation: Observation,
    pub reason: String,
}

impl RejectedObservation {
    pub(crate) fn new(observation: &Observation, reason: impl Into<String>) -> Self {
        Self {
            observation: observation.clone(),
            reason: reason.into(),
        }
    }
}
