use thiserror::Error;

use rankwatch_common::ValidationError;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Keyword already exists: {0}")]
    DuplicateKeyword(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// A single keyword's provider call failed. The batch logs it and moves on.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider timed out: {0}")]
    Timeout(String),

    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<scrapingdog_client::SerpError> for ProviderError {
    fn from(err: scrapingdog_client::SerpError) -> Self {
        use scrapingdog_client::SerpError;
        match err {
            SerpError::Timeout(msg) => ProviderError::Timeout(msg),
            SerpError::Api { status, message } => ProviderError::Status { status, message },
            other => ProviderError::Request(other.to_string()),
        }
    }
}

/// Preconditions that abort a whole run before any provider call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("credential not configured")]
    CredentialNotConfigured,

    #[error("target not configured")]
    TargetNotConfigured,

    #[error("no keywords")]
    NoKeywords,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store was unreachable. Observations fetched in this run are lost.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}
