use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

pub const CREATE_EVENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS events (
        id SERIAL PRIMARY KEY,
        event_type TEXT,
        user_id TEXT,
        properties JSONB,
        captured_at TIMESTAMPTZ DEFAULT NOW()
    )
"#;

/// Opens the connection pool. The target database must already exist.
pub async fn open(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    info!(
        "Connecting to database {} on {}:{}...",
        config.database, config.host, config.port
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_EVENTS_TABLE).execute(pool).await?;
    Ok(())
}

pub async fn close(pool: PgPool) {
    pool.close().await;
    info!("Database pool closed");
}
