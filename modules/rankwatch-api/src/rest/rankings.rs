use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use rankwatch_common::{Keyword, Observation, ValidationError};
use rankwatch_tracker::diff::DEFAULT_HISTORY_WINDOW;
use rankwatch_tracker::{keyword_rankings, KeywordRankings, StoreResult};

use super::{message, store_failure};
use crate::AppState;

#[derive(Deserialize)]
pub struct RankingsQuery {
    keyword_id: Option<Uuid>,
    limit: Option<usize>,
}

/// One externally supplied measurement. `check_date` defaults to now.
#[derive(Deserialize)]
pub struct RankingEntry {
    keyword_id: Uuid,
    url: String,
    position: i64,
    check_date: Option<DateTime<Utc>>,
}

impl RankingEntry {
    fn into_observation(self, now: DateTime<Utc>) -> Result<Observation, ValidationError> {
        let position = u32::try_from(self.position)
            .ok()
            .filter(|p| *p > 0)
            .ok_or(ValidationError::InvalidPosition(self.position))?;
        let observation = Observation {
            keyword_id: self.keyword_id,
            url: self.url.trim().to_string(),
            position,
            check_date: self.check_date.unwrap_or(now),
        };
        observation.validate()?;
        Ok(observation)
    }
}

/// One array element to an observation. Malformed entries fail alone.
fn parse_entry(value: serde_json::Value, now: DateTime<Utc>) -> Result<Observation, String> {
    let entry: RankingEntry = serde_json::from_value(value).map_err(|e| e.to_string())?;
    entry.into_observation(now).map_err(|e| e.to_string())
}

/// Rankings for one keyword, or every keyword sorted by term.
pub async fn api_rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingsQuery>,
) -> Response {
    let window = params
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_HISTORY_WINDOW);

    let keywords = match params.keyword_id {
        Some(id) => match state.store.find_keyword(id).await {
            Ok(Some(keyword)) => vec![keyword],
            Ok(None) => return message(StatusCode::NOT_FOUND, "Keyword not found"),
            Err(e) => return store_failure(e, "fetching ranking data"),
        },
        None => match state.store.list_keywords().await {
            Ok(keywords) => keywords,
            Err(e) => return store_failure(e, "fetching ranking data"),
        },
    };

    match collect_rankings(&state, &keywords, window).await {
        Ok(rankings) => Json(rankings).into_response(),
        Err(e) => store_failure(e, "fetching ranking data"),
    }
}

async fn collect_rankings(
    state: &AppState,
    keywords: &[Keyword],
    window: usize,
) -> StoreResult<Vec<KeywordRankings>> {
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let tracking = state.store.tracking_config().await?.unwrap_or_default();
    let mut rankings = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let recent = state.store.recent_observations(keyword.id, window).await?;
        rankings.push(keyword_rankings(keyword, &tracking, &recent, window));
    }
    Ok(rankings)
}

/// Bulk ingest. Bad entries are skipped and counted; the rest are stored.
pub async fn api_ingest_rankings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let serde_json::Value::Array(entries) = body else {
        return message(StatusCode::BAD_REQUEST, "Request body must be an array.");
    };

    let now = Utc::now();
    let mut invalid = 0usize;
    let observations: Vec<Observation> = entries
        .into_iter()
        .filter_map(|value| match parse_entry(value, now) {
            Ok(obs) => Some(obs),
            Err(reason) => {
                warn!(error = %reason, "Skipping ranking entry");
                invalid += 1;
                None
            }
        })
        .collect();

    if observations.is_empty() {
        return message(StatusCode::OK, "No valid ranking entries to insert.");
    }

    match state.store.insert_observations(&observations).await {
        Ok(report) => {
            let rejected = invalid + report.rejected.len();
            info!(inserted = report.inserted, rejected, "Ranking entries ingested");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "message": format!("Inserted {} ranking entries.", report.inserted),
                    "inserted": report.inserted,
                    "rejected": rejected,
                })),
            )
                .into_response()
        }
        Err(e) => store_failure(e, "saving ranking data"),
    }
}
