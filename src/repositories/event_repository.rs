use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{Event, EventKindRow, NewEvent};

pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, event: &NewEvent) -> Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO events (event_type, user_id, properties, captured_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&event.event_type)
        .bind(&event.user_id)
        .bind(&event.properties)
        .bind(event.captured_at)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    pub async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<EventKindRow>> {
        let rows = sqlx::query_as::<_, EventKindRow>(
            "SELECT event_type, properties FROM events WHERE captured_at >= $1",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Newest rows captured on the database's current calendar day.
    pub async fn list_recent_today(&self, limit: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, event_type, user_id, properties, captured_at
             FROM events
             WHERE captured_at::date = CURRENT_DATE
             ORDER BY id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }
}
