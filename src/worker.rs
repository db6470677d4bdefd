//! Worker loop: one engine, one thread, drain the queue.

use crate::engine::{EngineFactory, TransformEngine};
use crate::error::Result;
use crate::job::Job;
use crate::queue::WorkQueue;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{Level, debug, warn};

/// A single worker. Owns its engine and its results until it returns.
#[derive(Debug, Clone)]
pub struct Worker {
    name: String,
}

impl Worker {
    pub fn new(index: usize) -> Self {
        Self {
            name: format!("jobpool-worker-{index}"),
        }
    }

    /// Name used for the worker's thread and in log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build one engine, then transform jobs until the queue is empty.
    ///
    /// On the first failure the queue is halted so siblings stop after the
    /// job they hold, and the error is returned.
    pub fn run<F: EngineFactory>(&self, queue: &WorkQueue, factory: &F) -> Result<HashSet<Job>> {
        let mut engine = match factory.create() {
            Ok(engine) => engine,
            Err(e) => {
                let abandoned = queue.halt();
                warn!(worker = %self.name, abandoned, error = %e, "engine construction failed");
                return Err(e);
            }
        };

        let transformed = metrics::jobs_transformed();
        let failed = metrics::jobs_failed();
        let duration = metrics::transform_duration_ms();
        let labels = [KeyValue::new("worker", self.name.clone())];

        let mut done = HashSet::new();
        while let Some(job) = queue.poll() {
            if tracing::enabled!(Level::DEBUG) {
                debug!(worker = %self.name, source = %job.source, "transforming");
            }

            let started = Instant::now();
            match engine.transform(&job) {
                Ok(output) => {
                    duration.record(started.elapsed().as_secs_f64() * 1000.0, &labels);
                    transformed.add(1, &labels);
                    done.insert(job.complete(output));
                }
                Err(e) => {
                    failed.add(1, &labels);
                    let abandoned = queue.halt();
                    warn!(
                        worker = %self.name,
                        source = %job.source,
                        abandoned,
                        error = %e,
                        "transform failed, halting queue"
                    );
                    return Err(e);
                }
            }
        }

        debug!(worker = %self.name, jobs = done.len(), "worker drained");
        Ok(done)
    }
}
