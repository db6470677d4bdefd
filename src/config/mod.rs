//! Typed configuration.
//!
//! Environment variables are read once at startup (`dotenvy` loads a local
//! `.env` first in the binary). The optional TOML file describes the pool
//! and the command engine.

pub mod file;

use crate::error::{Error, Result};

pub use file::{PoolFile, PoolSection};

#[derive(Debug, Clone)]
pub struct Config {
    /// Requested worker count from `JOBPOOL_THREADS`.
    pub threads: Option<i64>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is required; malformed values fail fast.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            threads: optional_int("JOBPOOL_THREADS")?,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_int(name: &str) -> Result<Option<i64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{name}={raw:?} is not an integer: {e}"))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Config(format!("{name}: {e}"))),
    }
}

/// Pick the requested thread count: explicit flag, then environment, then
/// file. `None` means "use every available processor".
pub fn requested_threads(flag: Option<i64>, env: &Config, file: Option<&PoolFile>) -> Option<i64> {
    flag.or(env.threads).or_else(|| file.and_then(|f| f.pool.threads))
}
