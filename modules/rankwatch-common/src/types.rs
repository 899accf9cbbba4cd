use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::normalize_domain;
use crate::error::ValidationError;

// --- Keywords ---

/// A search term being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: Uuid,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

impl Keyword {
    /// Build a new keyword from user input. The term is trimmed.
    pub fn new(term: &str) -> Result<Self, ValidationError> {
        let keyword = clean_term(term)?;
        Ok(Self {
            id: Uuid::new_v4(),
            keyword,
            created_at: Utc::now(),
        })
    }
}

/// Trim a keyword term, rejecting blanks.
pub fn clean_term(term: &str) -> Result<String, ValidationError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyKeyword);
    }
    Ok(trimmed.to_string())
}

// --- Tracking configuration ---

/// What to track: one target domain and the competitors ranked against it.
///
/// A domain is either the target or a competitor, never both. Competitors are
/// kept in the order given, minus blanks and duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub url: String,
    #[serde(default)]
    pub competitor_urls: Vec<String>,
}

impl TrackingConfig {
    pub fn new<I, S>(target: &str, competitors: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let url = target.trim().to_string();
        if normalize_domain(&url).is_empty() {
            return Err(ValidationError::EmptyTarget);
        }

        let mut seen = vec![normalize_domain(&url)];
        let mut competitor_urls = Vec::new();
        for competitor in competitors {
            let competitor = competitor.as_ref().trim();
            let key = normalize_domain(competitor);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            competitor_urls.push(competitor.to_string());
        }

        Ok(Self {
            url,
            competitor_urls,
        })
    }

    pub fn has_target(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Target first, then competitors in configured order.
    pub fn tracked_urls(&self) -> Vec<String> {
        std::iter::once(self.url.clone())
            .chain(self.competitor_urls.iter().cloned())
            .collect()
    }

    pub fn is_target(&self, url: &str) -> bool {
        url == self.url
    }
}

// --- Observations ---

/// One rank measurement. `position` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub keyword_id: Uuid,
    pub url: String,
    pub position: u32,
    pub check_date: DateTime<Utc>,
}

impl Observation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.position == 0 {
            return Err(ValidationError::InvalidPosition(0));
        }
        if self.url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        Ok(())
    }
}

// --- Search results ---

/// One organic result as returned by the search provider, in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: Option<String>,
}

impl SearchResult {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
        }
    }
}

// --- Matching ---

/// How a tracked domain is compared against a result URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Result URL starts with the tracked domain. `example.com` also matches
    /// `example.com.evil.com`.
    #[default]
    Prefix,
    /// Like `Prefix`, but the match must end at a host boundary
    /// (end of string, `/`, `?`, `#` or `:`).
    Host,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Prefix => write!(f, "prefix"),
            MatchPolicy::Host => write!(f, "host"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Ok(MatchPolicy::Prefix),
            "host" => Ok(MatchPolicy::Host),
            other => Err(format!("unknown match policy '{other}' (expected prefix or host)")),
        }
    }
}
