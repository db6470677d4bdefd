//! Run report printed by the CLI.

use crate::job::Job;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub threads: usize,
    pub jobs: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    /// Completed records, sorted by source for stable output.
    pub results: Vec<Job>,
}

impl RunReport {
    pub fn new(
        threads: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        results: HashSet<Job>,
    ) -> Self {
        let mut results: Vec<Job> = results.into_iter().collect();
        results.sort_by(|a, b| a.source.cmp(&b.source));
        Self {
            run_id: Uuid::new_v4(),
            threads,
            jobs: results.len(),
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds(),
            results,
        }
    }
}
