use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::types::MatchPolicy;

/// Value shipped in `.env.example`. Treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "your_key_here";

/// Providers throttle below one request per second.
const MIN_PACING: Duration = Duration::from_millis(1000);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database (in-memory store when unset)
    pub database_url: Option<String>,

    // Search provider
    pub scrapingdog_api_key: Option<String>,
    pub serp_country: String,
    pub serp_timeout: Duration,

    // Rank checking
    pub pacing: Duration,
    pub match_policy: MatchPolicy,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            scrapingdog_api_key: None,
            serp_country: "gb".to_string(),
            serp_timeout: Duration::from_secs(30),
            pacing: MIN_PACING,
            match_policy: MatchPolicy::Prefix,
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let pacing_ms: u64 = parse_env("RANK_PACING_MS")?
            .unwrap_or(defaults.pacing.as_millis() as u64);
        let timeout_secs: u64 = parse_env("SERP_TIMEOUT_SECS")?
            .unwrap_or(defaults.serp_timeout.as_secs());

        let config = Self {
            database_url: optional_env("DATABASE_URL"),
            scrapingdog_api_key: optional_env("SCRAPINGDOG_API_KEY"),
            serp_country: optional_env("SERP_COUNTRY").unwrap_or(defaults.serp_country),
            serp_timeout: Duration::from_secs(timeout_secs),
            pacing: Duration::from_millis(pacing_ms).max(MIN_PACING),
            match_policy: optional_env("RANK_MATCH_POLICY")
                .map(|v| v.parse::<MatchPolicy>())
                .transpose()
                .map_err(anyhow::Error::msg)?
                .unwrap_or_default(),
            api_host: optional_env("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_env("API_PORT")?.unwrap_or(defaults.api_port),
        };

        config.log_redacted();
        Ok(config)
    }

    /// The provider key, unless it is missing, blank, or the placeholder.
    pub fn provider_key(&self) -> Option<&str> {
        usable_key(self.scrapingdog_api_key.as_deref())
    }

    pub fn log_redacted(&self) {
        fn preview_opt(val: Option<&str>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let n = v.chars().count().min(4);
                    let head: String = v.chars().take(n).collect();
                    format!("{head}...({} chars)", v.chars().count())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", preview_opt(self.database_url.as_deref()));
        tracing::info!(
            "  SCRAPINGDOG_API_KEY: {}",
            preview_opt(self.scrapingdog_api_key.as_deref())
        );
        tracing::info!("  SERP_COUNTRY: {}", self.serp_country);
        tracing::info!("  RANK_PACING_MS: {}", self.pacing.as_millis());
        tracing::info!("  RANK_MATCH_POLICY: {}", self.match_policy);
    }
}

/// A provider key is usable when it is non-blank and not the placeholder.
pub fn usable_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{key} must be a number"))
}
