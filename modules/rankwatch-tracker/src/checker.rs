// Batch rank check: fetch results for every keyword, match every tracked URL,
// persist the whole cohort in one bulk insert.
//
// Provider calls are strictly sequential with a pacing delay after each
// keyword. Per-keyword failures are logged and skipped; only the fail-fast
// preconditions and a store outage abort a run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use rankwatch_common::{Keyword, MatchPolicy, Observation, SearchResult, TrackingConfig};

use crate::error::{ConfigError, RunError};
use crate::fetcher::RankFetcher;
use crate::matcher::match_position;
use crate::store::{InsertReport, RankStore};

#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Sleep after each keyword, successful or not.
    pub pacing: Duration,
    pub match_policy: MatchPolicy,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::from_secs(1),
            match_policy: MatchPolicy::Prefix,
        }
    }
}

/// A keyword that produced no observations this run, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedKeyword {
    pub keyword_id: Uuid,
    pub keyword: String,
    pub reason: String,
}

/// Result of folding over all keywords, before anything is persisted.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub observations: Vec<Observation>,
    pub skipped: Vec<SkippedKeyword>,
}

impl BatchOutcome {
    fn skip(&mut self, keyword: &Keyword, reason: impl Into<String>) {
        self.skipped.push(SkippedKeyword {
            keyword_id: keyword.id,
            keyword: keyword.keyword.clone(),
            reason: reason.into(),
        });
    }
}

/// Stats from a rank check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub check_date: DateTime<Utc>,
    pub checked: usize,
    pub found: usize,
    pub skipped: usize,
    pub stored: usize,
    pub rejected: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Checked {} keywords, found {} ranks.",
            self.checked, self.found
        )?;
        if self.skipped > 0 || self.rejected > 0 {
            write!(
                f,
                " ({} keywords skipped, {} records rejected)",
                self.skipped, self.rejected
            )?;
        }
        Ok(())
    }
}

/// Observations for one keyword's result list: one per tracked URL that ranks.
pub fn observations_for(
    keyword: &Keyword,
    results: &[SearchResult],
    tracked: &[String],
    check_date: DateTime<Utc>,
    policy: MatchPolicy,
) -> Vec<Observation> {
    tracked
        .iter()
        .filter_map(|url| {
            let position = match_position(results, url, policy)?;
            Some(Observation {
                keyword_id: keyword.id,
                url: url.clone(),
                position,
                check_date,
            })
        })
        .collect()
}

/// The cohort timestamp for a new run: now at microsecond precision, nudged
/// past the previous run's timestamp if the clock hasn't moved beyond it.
pub fn next_check_date(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match last {
        Some(last) if now <= last => last + chrono::Duration::microseconds(1),
        _ => now,
    }
}

pub struct RankChecker {
    store: Arc<dyn RankStore>,
    fetcher: Arc<dyn RankFetcher>,
    settings: CheckSettings,
}

impl RankChecker {
    pub fn new(
        store: Arc<dyn RankStore>,
        fetcher: Arc<dyn RankFetcher>,
        settings: CheckSettings,
    ) -> Self {
        Self {
            store,
            fetcher,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn RankStore> {
        &self.store
    }

    /// Check every keyword against the given tracking config and persist the
    /// observations found.
    pub async fn run_batch(&self, tracking: Option<&TrackingConfig>) -> Result<RunSummary, RunError> {
        info!("Rank check starting");

        if !self.fetcher.credential_configured() {
            error!("Search provider API key is not configured");
            return Err(ConfigError::CredentialNotConfigured.into());
        }

        let Some(tracking) = tracking.filter(|t| t.has_target()) else {
            info!("Rank check aborted: target URL not set");
            return Err(ConfigError::TargetNotConfigured.into());
        };

        let keywords = self.store.list_keywords().await?;
        if keywords.is_empty() {
            info!("Rank check aborted: no keywords to check");
            return Err(ConfigError::NoKeywords.into());
        }

        let tracked = tracking.tracked_urls();
        let check_date = next_check_date(Utc::now(), self.store.latest_check_date().await?);
        info!(
            keywords = keywords.len(),
            tracked_urls = tracked.len(),
            %check_date,
            "Checking keywords"
        );

        let outcome = self.collect(&keywords, &tracked, check_date).await;

        let report = if outcome.observations.is_empty() {
            InsertReport::default()
        } else {
            info!(count = outcome.observations.len(), "Saving rank observations");
            self.store.insert_observations(&outcome.observations).await?
        };

        for rejected in &report.rejected {
            warn!(
                keyword_id = %rejected.observation.keyword_id,
                url = %rejected.observation.url,
                reason = %rejected.reason,
                "Rank observation rejected"
            );
        }

        let summary = RunSummary {
            check_date,
            checked: keywords.len(),
            found: outcome.observations.len(),
            skipped: outcome.skipped.len(),
            stored: report.inserted,
            rejected: report.rejected.len(),
        };
        info!(%summary, "Rank check finished");
        Ok(summary)
    }

    /// Fetch and match every keyword in order, one provider call at a time.
    pub async fn collect(
        &self,
        keywords: &[Keyword],
        tracked: &[String],
        check_date: DateTime<Utc>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for keyword in keywords {
            outcome = self.check_keyword(outcome, keyword, tracked, check_date).await;
            tokio::time::sleep(self.settings.pacing).await;
        }
        outcome
    }

    /// One fold step: fetch a keyword's results and add what it produced.
    async fn check_keyword(
        &self,
        mut acc: BatchOutcome,
        keyword: &Keyword,
        tracked: &[String],
        check_date: DateTime<Utc>,
    ) -> BatchOutcome {
        let query = keyword.keyword.as_str();
        debug!(keyword = query, "Checking keyword");

        match self.fetcher.fetch_results(query).await {
            Ok(results) if results.is_empty() => {
                info!(keyword = query, "No organic results for keyword");
                acc.skip(keyword, "no organic results");
            }
            Ok(results) => {
                let found = observations_for(
                    keyword,
                    &results,
                    tracked,
                    check_date,
                    self.settings.match_policy,
                );
                for obs in &found {
                    info!(keyword = query, url = %obs.url, position = obs.position, "Found rank");
                }
                acc.observations.extend(found);
            }
            Err(e) => {
                warn!(keyword = query, error = %e, "Provider call failed, skipping keyword");
                acc.skip(keyword, e.to_string());
            }
        }
        acc
    }
}
