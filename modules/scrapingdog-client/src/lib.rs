pub mod error;
pub mod types;

pub use error::{Result, SerpError};
pub use types::{OrganicResult, SerpResponse};

use std::time::Duration;

use types::SerpParams;

const BASE_URL: &str = "https://api.scrapingdog.com";

/// Country used when none is configured.
pub const DEFAULT_COUNTRY: &str = "gb";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ScrapingdogClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    country: String,
}

impl ScrapingdogClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        })
    }

    /// Localize every query to this country code.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Point the client at a different host (staging, local stub).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Run one Google SERP query.
    ///
    /// Non-2xx responses become [`SerpError::Api`]. A body that isn't a JSON
    /// object becomes [`SerpError::NotJson`].
    pub async fn serp(&self, query: &str) -> Result<SerpResponse> {
        tracing::debug!(query, country = %self.country, "Scrapingdog SERP request");

        let url = format!("{}/serp", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&SerpParams {
                api_key: &self.api_key,
                q: query,
                gl: &self.country,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SerpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        parse_body(&body)
    }
}

fn parse_body(body: &str) -> Result<SerpResponse> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value @ serde_json::Value::Object(_)) => Ok(serde_json::from_value(value)?),
        _ => Err(SerpError::NotJson(body.chars().take(120).collect())),
    }
}
