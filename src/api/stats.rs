use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use tracing::{debug, error};

use crate::api::response::{ApiError, ApiResult};
use crate::models::StatsReport;
use crate::repositories::EventRepository;
use crate::services::stats::aggregate;

use super::AppState;

pub const STATS_WINDOW_DAYS: i64 = 30;

#[axum::debug_handler]
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<StatsReport> {
    let Some(pool) = &state.pool else {
        return Ok(Json(StatsReport::empty()));
    };

    let since = Utc::now() - Duration::days(STATS_WINDOW_DAYS);
    let rows = EventRepository::new(pool)
        .list_since(since)
        .await
        .map_err(|e| {
            error!("Stats error: {:#}", e);
            ApiError::internal("Stats failed")
        })?;

    debug!("Aggregating {} event(s) since {}", rows.len(), since);

    Ok(Json(aggregate(&rows)))
}
