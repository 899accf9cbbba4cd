pub mod config;
pub mod domain;
pub mod error;
pub mod types;

pub use config::{Config, PLACEHOLDER_API_KEY};
pub use domain::normalize_domain;
pub use error::ValidationError;
pub use types::*;
