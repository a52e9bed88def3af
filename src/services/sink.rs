use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::models::NewEvent;
use crate::repositories::EventRepository;

/// A destination for normalized events. Failures are reported to the caller
/// and never retried.
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, event: &Map<String, Value>) -> Result<()>;
}

#[derive(Clone)]
pub struct DatabaseSink {
    pool: PgPool,
}

impl DatabaseSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSink for DatabaseSink {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn write(&self, event: &Map<String, Value>) -> Result<()> {
        let record = NewEvent::from_body(event);
        EventRepository::new(&self.pool).insert(&record).await?;
        Ok(())
    }
}
