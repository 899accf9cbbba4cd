use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use tracing::{info, warn};

use rankwatch_tracker::TriggerAck;

use super::message;
use crate::AppState;

/// Queue a rank check and answer immediately. The outcome only shows up in
/// the logs and, later, in the rankings.
pub async fn api_check_ranks(State(state): State<Arc<AppState>>) -> Response {
    info!("Received rank check request");
    match state.trigger.request() {
        TriggerAck::Accepted => message(StatusCode::ACCEPTED, "Rank checking job started."),
        TriggerAck::AlreadyQueued => {
            message(StatusCode::ACCEPTED, "Rank checking job already queued.")
        }
        TriggerAck::Stopped => {
            warn!("Rank check worker is not running");
            message(
                StatusCode::SERVICE_UNAVAILABLE,
                "Rank checking is unavailable.",
            )
        }
    }
}
