use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::info;

use rankwatch_common::TrackingConfig;

use super::{message, store_failure};
use crate::AppState;

#[derive(Deserialize)]
pub struct SaveConfigRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    competitor_urls: Vec<String>,
}

/// The saved config, or an empty one if nothing has been saved yet.
pub async fn api_get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.tracking_config().await {
        Ok(config) => Json(config.unwrap_or_default()).into_response(),
        Err(e) => store_failure(e, "fetching configuration"),
    }
}

pub async fn api_save_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveConfigRequest>,
) -> impl IntoResponse {
    let config = match TrackingConfig::new(&body.url, &body.competitor_urls) {
        Ok(config) => config,
        Err(e) => return message(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.store.save_tracking_config(&config).await {
        Ok(saved) => {
            info!(
                target_url = %saved.url,
                competitors = saved.competitor_urls.len(),
                "Tracking config saved"
            );
            Json(saved).into_response()
        }
        Err(e) => store_failure(e, "saving configuration"),
    }
}
