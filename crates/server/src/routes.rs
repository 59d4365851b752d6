pub mod survey;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use std::path::Path;

use common::types::Health;

use crate::errors::panic_response;
use crate::observability;
use crate::state::AppState;

/// Path the form pages post to.
pub const SURVEY_PATH: &str = "/api/leadsquared";

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router: survey API, health, metrics, and the static form pages
pub fn build_router(state: AppState, public_dir: &str, cors: CorsLayer) -> Router {
    observability::register_all();

    let index = Path::new(public_dir).join("index.html");
    let static_dir = ServeDir::new(public_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route(
            SURVEY_PATH,
            post(survey::submit).fallback(survey::method_not_allowed),
        )
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
