// Test mocks for the rank checker.
//
// MockFetcher stands in for the search provider: canned results or failures
// per keyword, and a log of every call made, so tests can assert on call
// counts and order without touching the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use rankwatch_common::SearchResult;

use crate::error::ProviderError;
use crate::fetcher::RankFetcher;

enum Canned {
    Results(Vec<SearchResult>),
    Fail(u16, String),
}

/// HashMap-based fetcher. Unregistered keywords return an empty result list.
pub struct MockFetcher {
    responses: HashMap<String, Canned>,
    credential: bool,
    calls: Mutex<Vec<String>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            credential: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Results for `keyword`, given as URLs in rank order.
    pub fn on_search(mut self, keyword: &str, urls: &[&str]) -> Self {
        let results = urls.iter().map(|u| SearchResult::new(u)).collect();
        self.responses
            .insert(keyword.to_string(), Canned::Results(results));
        self
    }

    /// Fail `keyword` with an upstream status.
    pub fn on_failure(mut self, keyword: &str, status: u16, message: &str) -> Self {
        self.responses
            .insert(keyword.to_string(), Canned::Fail(status, message.to_string()));
        self
    }

    /// Behave as if no API key is configured.
    pub fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    /// Keywords queried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RankFetcher for MockFetcher {
    fn credential_configured(&self) -> bool {
        self.credential
    }

    async fn fetch_results(&self, term: &str) -> Result<Vec<SearchResult>, ProviderError> {
        self.calls.lock().unwrap().push(term.to_string());
        match self.responses.get(term) {
            Some(Canned::Results(results)) => Ok(results.clone()),
            Some(Canned::Fail(status, message)) => Err(ProviderError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
