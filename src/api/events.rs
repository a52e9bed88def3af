use axum::{extract::State, Json};
use tracing::error;

use crate::models::RecentEvent;
use crate::repositories::EventRepository;

use super::AppState;

pub const RECENT_EVENTS_LIMIT: i64 = 20;

/// Today's newest events. Storage problems yield an empty list, never an
/// error status.
pub async fn list_recent_events(State(state): State<AppState>) -> Json<Vec<RecentEvent>> {
    let Some(pool) = &state.pool else {
        return Json(Vec::new());
    };

    match EventRepository::new(pool)
        .list_recent_today(RECENT_EVENTS_LIMIT)
        .await
    {
        Ok(events) => Json(events.into_iter().map(RecentEvent::from).collect()),
        Err(e) => {
            error!("Error reading events: {:#}", e);
            Json(Vec::new())
        }
    }
}
