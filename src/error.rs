//! Error types for jobpool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transform failed for {job}: {reason}")]
    Transform { job: String, reason: String },

    #[error("engine construction failed: {0}")]
    Engine(String),

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a transform failure for the job identified by `job`.
    pub fn transform(job: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transform {
            job: job.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
