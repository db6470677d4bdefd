//! Pool coordinator: clamp the thread count, fan jobs out to workers over a
//! shared queue, join everyone, merge the per-worker result sets.

use crate::engine::EngineFactory;
use crate::error::{Error, Result};
use crate::job::{Job, check_pending};
use crate::queue::WorkQueue;
use crate::telemetry::pool::{start_run_span, start_worker_span};
use crate::threads::{HostCapacity, SystemCapacity, resolve_with};
use crate::worker::Worker;
use std::collections::HashSet;
use std::thread;
use tracing::{Dispatch, dispatcher, info, warn};
use uuid::Uuid;

/// Runs a job set on a fixed number of worker threads.
pub struct PoolCoordinator<F> {
    factory: F,
    threads: usize,
}

/// What one worker thread handed back at join time.
type WorkerOutcome = (String, Result<HashSet<Job>>);

impl<F: EngineFactory> PoolCoordinator<F> {
    /// Coordinator sized against the host's processors.
    pub fn new(requested_threads: i64, factory: F) -> Self {
        Self::with_capacity(requested_threads, factory, &SystemCapacity)
    }

    /// Coordinator sized against an explicit capacity source.
    pub fn with_capacity(requested_threads: i64, factory: F, capacity: &dyn HostCapacity) -> Self {
        Self {
            factory,
            threads: resolve_with(requested_threads, capacity),
        }
    }

    /// Number of workers each `execute` call launches.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Transform every job exactly once and return the completed records.
    ///
    /// Blocks until all workers have returned. If any worker fails the
    /// completed results are discarded and the first failure (lowest worker
    /// index) is returned.
    ///
    /// Fails with [`Error::Config`] before any worker starts if an input
    /// job is already completed.
    pub fn execute(&self, jobs: HashSet<Job>) -> Result<HashSet<Job>> {
        check_pending(&jobs)?;
        if jobs.is_empty() {
            return Ok(HashSet::new());
        }

        let run_id = Uuid::new_v4();
        let expected = jobs.len();
        let run_span = start_run_span(&run_id, self.threads, expected);
        let _entered = run_span.enter();

        let queue = WorkQueue::seeded(jobs);
        let factory = &self.factory;
        // Workers log through the caller's subscriber, scoped or global.
        let dispatch = dispatcher::get_default(Dispatch::clone);

        let outcomes: Vec<WorkerOutcome> = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.threads);
            let mut outcomes = Vec::new();

            for index in 0..self.threads {
                let worker = Worker::new(index);
                let name = worker.name().to_string();
                let queue = &queue;
                let worker_span = start_worker_span(&run_span, &name);

                let dispatch = dispatch.clone();

                let spawned = thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(scope, move || {
                        dispatcher::with_default(&dispatch, || {
                            let _entered = worker_span.enter();
                            worker.run(queue, factory)
                        })
                    });

                match spawned {
                    Ok(handle) => handles.push((name, handle)),
                    Err(e) => {
                        let abandoned = queue.halt();
                        warn!(worker = %name, abandoned, error = %e, "failed to spawn worker thread");
                        outcomes.push((name, Err(Error::Io(e))));
                        break;
                    }
                }
            }

            for (name, handle) in handles {
                let outcome = match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(Error::WorkerPanicked {
                        worker: name.clone(),
                    }),
                };
                outcomes.push((name, outcome));
            }
            outcomes
        });

        merge(outcomes, expected)
    }
}

/// Flatten per-worker sets, or surface the first failure.
fn merge(outcomes: Vec<WorkerOutcome>, expected: usize) -> Result<HashSet<Job>> {
    let mut results = HashSet::with_capacity(expected);
    let mut failure = None;

    for (worker, outcome) in outcomes {
        match outcome {
            Ok(done) => results.extend(done),
            Err(e) if failure.is_none() => failure = Some(e),
            Err(e) => warn!(worker = %worker, error = %e, "additional worker failure"),
        }
    }

    if let Some(e) = failure {
        warn!(discarded = results.len(), "run failed, discarding completed results");
        return Err(e);
    }

    if results.len() != expected {
        return Err(Error::Other(format!(
            "expected {expected} completed jobs, collected {}",
            results.len()
        )));
    }

    info!(jobs = results.len(), "all workers drained");
    Ok(results)
}
