use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Keyword is required")]
    EmptyKeyword,

    #[error("Target URL is required")]
    EmptyTarget,

    #[error("Position must be a positive integer, got {0}")]
    InvalidPosition(i64),

    #[error("Observation URL is required")]
    EmptyUrl,
}
