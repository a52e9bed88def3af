pub mod capture;
pub mod events;
pub mod health;
pub mod response;
pub mod stats;
pub mod ui;

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::EventRecorder;

/// Shared handler state. `pool` is `None` when the database could not be
/// reached at startup; handlers then answer from empty data.
#[derive(Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub recorder: EventRecorder,
}

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let router = Router::new()
        .route("/capture", post(capture::capture_event))
        .route("/capture/", post(capture::capture_event))
        .route("/batch", post(capture::capture_batch))
        .route("/batch/", post(capture::capture_batch))
        .route("/health", get(health::health_check))
        .route("/stats", get(stats::get_stats))
        .route("/api/events", get(events::list_recent_events));

    // Ingestion accepts batches of any size.
    ui::attach(router, static_dir)
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
