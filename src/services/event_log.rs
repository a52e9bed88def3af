use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::sink::EventSink;

/// Append-only JSON-lines log, one file per local calendar day.
#[derive(Debug, Clone)]
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the log directory if it does not exist yet.
    pub async fn init(dir: impl Into<PathBuf>) -> Result<Self> {
        let log = Self::new(dir);
        fs::create_dir_all(&log.dir).await?;
        info!("Event log directory: {}", log.dir.display());
        Ok(log)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("telemetry-{}.jsonl", date.format("%Y-%m-%d")))
    }

    pub async fn append(&self, event: &Map<String, Value>) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let path = self.path_for(Local::now().date_naive());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}

#[async_trait]
impl EventSink for EventLog {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn write(&self, event: &Map<String, Value>) -> Result<()> {
        self.append(event).await
    }
}
