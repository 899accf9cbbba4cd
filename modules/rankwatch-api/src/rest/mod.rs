pub mod checks;
pub mod config;
pub mod keywords;
pub mod rankings;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use rankwatch_tracker::StoreError;

// --- Helpers ---

pub(crate) fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "message": text.into() }))).into_response()
}

/// Map a store failure to a response. Validation and duplicates are the
/// caller's fault; everything else is logged and hidden behind a 500.
pub(crate) fn store_failure(err: StoreError, context: &str) -> Response {
    match err {
        StoreError::Invalid(e) => message(StatusCode::BAD_REQUEST, e.to_string()),
        StoreError::DuplicateKeyword(_) => message(StatusCode::CONFLICT, "Keyword already exists"),
        other => {
            warn!(error = %other, "{context}");
            message(StatusCode::INTERNAL_SERVER_ERROR, format!("Server error: {context}"))
        }
    }
}
