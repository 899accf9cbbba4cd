// RankFetcher: one provider call per keyword, returning organic results in rank order.
//
// The trait is the seam between the batch checker and the network, so the
// checker can be driven by MockFetcher in tests.

use async_trait::async_trait;
use tracing::{info, warn};

use rankwatch_common::config::usable_key;
use rankwatch_common::SearchResult;
use scrapingdog_client::{ScrapingdogClient, SerpError, SerpResponse};

use crate::error::ProviderError;

#[async_trait]
pub trait RankFetcher: Send + Sync {
    /// Whether a real (non-placeholder) provider credential is configured.
    fn credential_configured(&self) -> bool;

    /// Organic results for `term`, best first. An empty list means the
    /// provider had no usable data for this keyword.
    async fn fetch_results(&self, term: &str) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Production fetcher backed by the Scrapingdog SERP API.
pub struct ScrapingdogFetcher {
    client: ScrapingdogClient,
}

impl ScrapingdogFetcher {
    pub fn new(client: ScrapingdogClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RankFetcher for ScrapingdogFetcher {
    fn credential_configured(&self) -> bool {
        usable_key(Some(self.client.api_key())).is_some()
    }

    async fn fetch_results(&self, term: &str) -> Result<Vec<SearchResult>, ProviderError> {
        results_from(term, self.client.serp(term).await)
    }
}

/// Map one provider call's outcome to the keyword's organic results.
///
/// Payloads that can't be read (an HTML login page, broken JSON) give an
/// empty list. Transport, timeout and status failures are errors.
fn results_from(
    term: &str,
    outcome: scrapingdog_client::Result<SerpResponse>,
) -> Result<Vec<SearchResult>, ProviderError> {
    let resp = match outcome {
        Ok(resp) => resp,
        Err(SerpError::NotJson(body)) => {
            warn!(
                keyword = term,
                body = %body,
                "Expected JSON from provider but got something else. Check the API key"
            );
            return Ok(Vec::new());
        }
        Err(SerpError::Parse(msg)) => {
            warn!(keyword = term, error = %msg, "Unreadable provider payload");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let results: Vec<SearchResult> = resp
        .organic_results
        .into_iter()
        .map(|r| SearchResult { url: r.link })
        .collect();

    info!(keyword = term, count = results.len(), "Fetched organic results");
    Ok(results)
}
