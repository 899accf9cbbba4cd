use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{message, store_failure};
use crate::AppState;

#[derive(Deserialize)]
pub struct AddKeywordRequest {
    #[serde(default)]
    keyword: String,
}

pub async fn api_add_keyword(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddKeywordRequest>,
) -> impl IntoResponse {
    match state.store.insert_keyword(&body.keyword).await {
        Ok(keyword) => {
            info!(keyword = %keyword.keyword, id = %keyword.id, "Keyword added");
            (StatusCode::CREATED, Json(keyword)).into_response()
        }
        Err(e) => store_failure(e, "adding keyword"),
    }
}

pub async fn api_list_keywords(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_keywords().await {
        Ok(keywords) => Json(keywords).into_response(),
        Err(e) => store_failure(e, "fetching keywords"),
    }
}

pub async fn api_delete_keyword(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.delete_keyword(id).await {
        Ok(true) => {
            info!(%id, "Keyword deleted");
            message(StatusCode::OK, "Keyword and associated rankings deleted")
        }
        Ok(false) => message(StatusCode::NOT_FOUND, "Keyword not found"),
        Err(e) => store_failure(e, "deleting keyword"),
    }
}
