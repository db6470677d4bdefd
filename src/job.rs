//! Job records.
//!
//! A job is identified by its source. Processing pairs the source with a
//! result and yields a new record; the pending record is never mutated.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One unit of transformation work.
///
/// Equality and hashing cover both fields, so a completed record is a
/// different value from the pending record it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    /// Opaque input identifier (a path, a module name, inline content).
    pub source: String,

    /// Output produced by the engine. `None` while pending.
    pub result: Option<String>,
}

impl Job {
    /// A pending job for `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            result: None,
        }
    }

    /// A pending job for a file path.
    ///
    /// Sources are strings, so a path that is not valid UTF-8 is rejected
    /// rather than lossily converted into a name no engine could open.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.to_str().map(Self::new).ok_or_else(|| {
            Error::Config(format!("source path is not valid UTF-8: {}", path.display()))
        })
    }

    /// Pair this job with its output, producing the completed record.
    pub fn complete(self, result: impl Into<String>) -> Self {
        Self {
            source: self.source,
            result: Some(result.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.result {
            Some(ref result) => write!(f, "{} -> {}", self.source, result),
            None => write!(f, "{} (pending)", self.source),
        }
    }
}

/// Check that every job in an input set is still pending.
///
/// `HashSet<Job>` compares whole records, so a pending and a completed
/// record for the same source can sit side by side. Once every record is
/// pending, set membership is uniqueness by source.
pub fn check_pending(jobs: &HashSet<Job>) -> Result<()> {
    match jobs.iter().find(|job| job.is_completed()) {
        Some(job) => Err(Error::Config(format!("job {} is already completed", job.source))),
        None => Ok(()),
    }
}
