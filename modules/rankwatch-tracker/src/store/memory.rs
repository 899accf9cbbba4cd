use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use rankwatch_common::{clean_term, Keyword, Observation, TrackingConfig};

use super::{InsertReport, RankStore, RejectedObservation};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    keywords: Vec<Keyword>,
    config: Option<TrackingConfig>,
    observations: Vec<Observation>,
}

/// In-process store with the same semantics as the Postgres one.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored observation, in insertion order.
    pub async fn observations(&self) -> Vec<Observation> {
        self.inner.read().await.observations.clone()
    }
}

#[async_trait]
impl RankStore for MemoryStore {
    async fn list_keywords(&self) -> StoreResult<Vec<Keyword>> {
        let mut keywords = self.inner.read().await.keywords.clone();
        keywords.sort_by(|a, b| a.keyword.cmp(&b.keyword));
        Ok(keywords)
    }

    async fn find_keyword(&self, id: Uuid) -> StoreResult<Option<Keyword>> {
        let inner = self.inner.read().await;
        Ok(inner.keywords.iter().find(|k| k.id == id).cloned())
    }

    async fn insert_keyword(&self, term: &str) -> StoreResult<Keyword> {
        let term = clean_term(term)?;
        let mut inner = self.inner.write().await;
        if inner.keywords.iter().any(|k| k.keyword == term) {
            return Err(StoreError::DuplicateKeyword(term));
        }
        let keyword = Keyword::new(&term)?;
        inner.keywords.push(keyword.clone());
        Ok(keyword)
    }

    async fn delete_keyword(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.keywords.len();
        inner.keywords.retain(|k| k.id != id);
        if inner.keywords.len() == before {
            return Ok(false);
        }
        inner.observations.retain(|o| o.keyword_id != id);
        Ok(true)
    }

    async fn tracking_config(&self) -> StoreResult<Option<TrackingConfig>> {
        Ok(self.inner.read().await.config.clone())
    }

    async fn save_tracking_config(&self, config: &TrackingConfig) -> StoreResult<TrackingConfig> {
        self.inner.write().await.config = Some(config.clone());
        Ok(config.clone())
    }

    async fn insert_observations(&self, observations: &[Observation]) -> StoreResult<InsertReport> {
        let mut inner = self.inner.write().await;
        let mut report = InsertReport::default();

        for obs in observations {
            if let Err(e) = obs.validate() {
                report.rejected.push(RejectedObservation::new(obs, e.to_string()));
                continue;
            }
            if !inner.keywords.iter().any(|k| k.id == obs.keyword_id) {
                report
                    .rejected
                    .push(RejectedObservation::new(obs, "unknown keyword"));
                continue;
            }
            inner.observations.push(obs.clone());
            report.inserted += 1;
        }

        Ok(report)
    }

    async fn recent_observations(
        &self,
        keyword_id: Uuid,
        per_url: usize,
    ) -> StoreResult<Vec<Observation>> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Observation> = inner
            .observations
            .iter()
            .filter(|o| o.keyword_id == keyword_id)
            .collect();
        matching.sort_by(|a, b| b.check_date.cmp(&a.check_date));

        let mut taken: HashMap<String, usize> = HashMap::new();
        let recent = matching
            .into_iter()
            .filter(|o| {
                let count = taken.entry(o.url.clone()).or_insert(0);
                *count += 1;
                *count <= per_url
            })
            .cloned()
            .collect();
        Ok(recent)
    }

    async fn latest_check_date(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let inner = self.inner.read().await;
        Ok(inner.observations.iter().map(|o| o.check_date).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn obs(keyword_id: Uuid, url: &str, position: u32, check_date: DateTime<Utc>) -> Observation {
        Observation {
            keyword_id,
            url: url.to_string(),
            position,
            check_date,
        }
    }

    #[tokio::test]
    async fn duplicate_keyword_is_rejected_after_trim() {
        let store = MemoryStore::new();
        store.insert_keyword("rust").await.unwrap();

        let err = store.insert_keyword("  rust ").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKeyword(term) if term == "rust"));
    }

    #[tokio::test]
    async fn keywords_list_in_term_order() {
        let store = MemoryStore::new();
        store.insert_keyword("zebra").await.unwrap();
        store.insert_keyword("apple").await.unwrap();

        let terms: Vec<String> = store
            .list_keywords()
            .await
            .unwrap()
            .into_iter()
            .map(|k| k.keyword)
            .collect();
        assert_eq!(terms, vec!["apple", "zebra"]);
    }

    #[tokio::test]
    async fn deleting_keyword_cascades_observations() {
        let store = MemoryStore::new();
        let kept = store.insert_keyword("kept").await.unwrap();
        let gone = store.insert_keyword("gone").await.unwrap();
        let now = Utc::now();
        store
            .insert_observations(&[
                obs(kept.id, "example.com", 1, now),
                obs(gone.id, "example.com", 2, now),
            ])
            .await
            .unwrap();

        assert!(store.delete_keyword(gone.id).await.unwrap());
        assert!(!store.delete_keyword(gone.id).await.unwrap());

        let remaining = store.observations().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].keyword_id, kept.id);
    }

    #[tokio::test]
    async fn bulk_insert_keeps_valid_records() {
        let store = MemoryStore::new();
        let kw = store.insert_keyword("coffee").await.unwrap();
        let now = Utc::now();

        let report = store
            .insert_observations(&[
                obs(kw.id, "example.com", 3, now),
                obs(kw.id, "example.com", 0, now),
                obs(Uuid::new_v4(), "example.com", 1, now),
                obs(kw.id, "rival.com", 7, now),
            ])
            .await
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(store.observations().await.len(), 2);
    }

    #[tokio::test]
    async fn recent_observations_limit_per_url() {
        let store = MemoryStore::new();
        let kw = store.insert_keyword("tea").await.unwrap();
        let now = Utc::now();
        let history: Vec<Observation> = (0..4)
            .flat_map(|day| {
                let at = now - Duration::days(day);
                vec![obs(kw.id, "a.com", 1 + day as u32, at), obs(kw.id, "b.com", 5, at)]
            })
            .collect();
        store.insert_observations(&history).await.unwrap();

        let recent = store.recent_observations(kw.id, 2).await.unwrap();

        assert_eq!(recent.len(), 4);
        let a: Vec<u32> = recent.iter().filter(|o| o.url == "a.com").map(|o| o.position).collect();
        assert_eq!(a, vec![1, 2]);
    }

    #[tokio::test]
    async fn config_is_upserted() {
        let store = MemoryStore::new();
        assert!(store.tracking_config().await.unwrap().is_none());

        let first = TrackingConfig::new("a.com", ["b.com"]).unwrap();
        let second = TrackingConfig::new("c.com", Vec::<String>::new()).unwrap();
        store.save_tracking_config(&first).await.unwrap();
        store.save_tracking_config(&second).await.unwrap();

        assert_eq!(store.tracking_config().await.unwrap(), Some(second));
    }
}
