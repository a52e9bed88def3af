use std::env;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Connection settings for the PostgreSQL event store.
///
/// Every field maps to one of the libpq-style `PG*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            database: "telemetry".to_string(),
            port: 5432,
            max_connections: 10,
        }
    }
}

/// `user@host:port/database`; the password is never printed.
impl fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub log_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    /// Reads the process environment, loading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset keys fall back to
    /// their defaults; numeric keys that are set but unparseable are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DatabaseConfig::default();
        let string_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            host: string_or("PGHOST", &defaults.host),
            user: string_or("PGUSER", &defaults.user),
            password: string_or("PGPASSWORD", &defaults.password),
            database: string_or("PGDATABASE", &defaults.database),
            port: parse_or(&lookup, "PGPORT", defaults.port)?,
            max_connections: parse_or(&lookup, "PG_MAX_CONNECTIONS", defaults.max_connections)?,
        };

        Ok(Self {
            host: string_or("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 8000)?,
            database,
            log_dir: PathBuf::from(string_or("LOG_DIR", "logs")),
            static_dir: PathBuf::from(string_or("STATIC_DIR", "frontend/dist")),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}
