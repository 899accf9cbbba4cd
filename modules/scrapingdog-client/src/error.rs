use thiserror::Error;

pub type Result<T> = std::result::Result<T, SerpError>;

#[derive(Debug, Error)]
pub enum SerpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The body was not a JSON object. Scrapingdog answers with an HTML page
    /// when the API key is rejected.
    #[error("Expected JSON but got something else: {0}")]
    NotJson(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SerpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SerpError::Timeout(err.to_string())
        } else {
            SerpError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SerpError {
    fn from(err: serde_json::Error) -> Self {
        SerpError::Parse(err.to_string())
    }
}
