// Rank movement between the two newest observations of a (keyword, URL) pair,
// plus the per-keyword rankings view built on top of it.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use rankwatch_common::{Keyword, Observation, TrackingConfig};

/// Observations per URL needed to compute a change.
pub const DEFAULT_HISTORY_WINDOW: usize = 2;

/// Movement of a URL between its previous and current observation.
/// Positions are 1-based and lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeIndicator {
    NoPriorData,
    New,
    Gone,
    NoChange,
    Improved(u32),
    Worsened(u32),
}

/// Compare the current position against the previous one.
pub fn compute_change(current: Option<u32>, previous: Option<u32>) -> ChangeIndicator {
    match (current, previous) {
        (None, None) => ChangeIndicator::NoPriorData,
        (Some(_), None) => ChangeIndicator::New,
        (None, Some(_)) => ChangeIndicator::Gone,
        (Some(cur), Some(prev)) if prev > cur => ChangeIndicator::Improved(prev - cur),
        (Some(cur), Some(prev)) if prev < cur => ChangeIndicator::Worsened(cur - prev),
        (Some(_), Some(_)) => ChangeIndicator::NoChange,
    }
}

impl fmt::Display for ChangeIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeIndicator::NoPriorData => Ok(()),
            ChangeIndicator::New => write!(f, "New"),
            ChangeIndicator::Gone => write!(f, "Gone"),
            ChangeIndicator::NoChange => write!(f, "NC"),
            ChangeIndicator::Improved(n) => write!(f, "+{n}"),
            ChangeIndicator::Worsened(n) => write!(f, "-{n}"),
        }
    }
}

/// Serialized as its display string; no prior data becomes `null`.
impl Serialize for ChangeIndicator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChangeIndicator::NoPriorData => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

/// Current and previous observation for one (keyword, URL) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankSnapshot {
    pub current: Option<Observation>,
    pub previous: Option<Observation>,
}

impl RankSnapshot {
    /// Build from a URL's observations, newest first.
    pub fn from_newest_first(history: &[Observation]) -> Self {
        Self {
            current: history.first().cloned(),
            previous: history.get(1).cloned(),
        }
    }

    pub fn change(&self) -> ChangeIndicator {
        compute_change(
            self.current.as_ref().map(|o| o.position),
            self.previous.as_ref().map(|o| o.position),
        )
    }
}

/// One tracked URL's standing for a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlRank {
    pub url: String,
    pub is_target: bool,
    pub current_rank: Option<u32>,
    pub last_check_date: Option<DateTime<Utc>>,
    pub change: ChangeIndicator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRankings {
    pub keyword_id: Uuid,
    pub keyword_text: String,
    pub url_data: Vec<UrlRank>,
}

/// Rankings for one keyword from its recent observations (any order).
///
/// Each tracked URL keeps at most `window` of its newest observations; only
/// the first two feed the change. Target first, then competitors by URL.
pub fn keyword_rankings(
    keyword: &Keyword,
    tracking: &TrackingConfig,
    recent: &[Observation],
    window: usize,
) -> KeywordRankings {
    let mut sorted: Vec<&Observation> = recent.iter().collect();
    sorted.sort_by(|a, b| b.check_date.cmp(&a.check_date));

    let mut by_url: HashMap<&str, Vec<Observation>> = HashMap::new();
    for obs in sorted {
        let entry = by_url.entry(obs.url.as_str()).or_default();
        if entry.len() < window.max(1) {
            entry.push(obs.clone());
        }
    }

    let urls = if tracking.has_target() {
        tracking.tracked_urls()
    } else {
        tracking.competitor_urls.clone()
    };

    let mut url_data: Vec<UrlRank> = urls
        .into_iter()
        .map(|url| {
            let history = by_url.get(url.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let snapshot = RankSnapshot::from_newest_first(history);
            UrlRank {
                is_target: tracking.has_target() && tracking.is_target(&url),
                current_rank: snapshot.current.as_ref().map(|o| o.position),
                last_check_date: snapshot.current.as_ref().map(|o| o.check_date),
                change: snapshot.change(),
                url,
            }
        })
        .collect();

    url_data.sort_by(|a, b| b.is_target.cmp(&a.is_target).then_with(|| a.url.cmp(&b.url)));

    KeywordRankings {
        keyword_id: keyword.id,
        keyword_text: keyword.keyword.clone(),
        url_data,
    }
}
