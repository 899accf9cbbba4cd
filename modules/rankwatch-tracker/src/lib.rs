pub mod checker;
pub mod diff;
pub mod error;
pub mod fetcher;
pub mod matcher;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod trigger;

pub use checker::{BatchOutcome, CheckSettings, RankChecker, RunSummary, SkippedKeyword};
pub use diff::{compute_change, keyword_rankings, ChangeIndicator, KeywordRankings, RankSnapshot, UrlRank};
pub use error::{ConfigError, ProviderError, RunError, StoreError, StoreResult};
pub use fetcher::{RankFetcher, ScrapingdogFetcher};
pub use matcher::match_position;
pub use store::{InsertReport, MemoryStore, PgRankStore, RankStore, RejectedObservation};
pub use trigger::{CheckTrigger, TriggerAck};
