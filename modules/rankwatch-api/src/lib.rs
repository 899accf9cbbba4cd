use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{delete, get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use rankwatch_tracker::{CheckTrigger, RankStore};

pub mod rest;

pub struct AppState {
    pub store: Arc<dyn RankStore>,
    pub trigger: CheckTrigger,
}

impl AppState {
    pub fn new(store: Arc<dyn RankStore>, trigger: CheckTrigger) -> Self {
        Self { store, trigger }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Keywords
        .route(
            "/api/keywords",
            get(rest::keywords::api_list_keywords).post(rest::keywords::api_add_keyword),
        )
        .route("/api/keywords/{id}", delete(rest::keywords::api_delete_keyword))
        // Tracking config
        .route(
            "/api/config",
            get(rest::config::api_get_config).put(rest::config::api_save_config),
        )
        // Rankings
        .route(
            "/api/rankings",
            get(rest::rankings::api_rankings).post(rest::rankings::api_ingest_rankings),
        )
        .route("/api/check-ranks", post(rest::checks::api_check_ranks))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
