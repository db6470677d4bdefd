//! Execution strategies: run a job set sequentially on the calling thread
//! or in parallel on a worker pool.

use crate::engine::EngineFactory;
use crate::error::Result;
use crate::job::{Job, check_pending};
use crate::pool::PoolCoordinator;
use crate::queue::WorkQueue;
use crate::threads::{HostCapacity, resolve_with};
use crate::worker::Worker;
use std::collections::HashSet;

/// Something that can process a job set into its completed records.
pub trait Strategy {
    fn execute(&self, jobs: HashSet<Job>) -> Result<HashSet<Job>>;

    /// Workers this strategy runs with.
    fn threads(&self) -> usize;
}

impl<F: EngineFactory> Strategy for PoolCoordinator<F> {
    fn execute(&self, jobs: HashSet<Job>) -> Result<HashSet<Job>> {
        PoolCoordinator::execute(self, jobs)
    }

    fn threads(&self) -> usize {
        PoolCoordinator::threads(self)
    }
}

/// One engine, the calling thread, no spawning.
pub struct SequentialStrategy<F> {
    factory: F,
}

impl<F: EngineFactory> SequentialStrategy<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: EngineFactory> Strategy for SequentialStrategy<F> {
    fn execute(&self, jobs: HashSet<Job>) -> Result<HashSet<Job>> {
        check_pending(&jobs)?;
        if jobs.is_empty() {
            return Ok(HashSet::new());
        }
        let queue = WorkQueue::seeded(jobs);
        Worker::new(0).run(&queue, &self.factory)
    }

    fn threads(&self) -> usize {
        1
    }
}

/// Pick a strategy for `job_count` jobs.
///
/// Sequential when the clamped thread count is 1 or there is at most one
/// job to do; a pool otherwise.
pub fn select<F>(
    requested_threads: i64,
    job_count: usize,
    factory: F,
    capacity: &dyn HostCapacity,
) -> Box<dyn Strategy + Send>
where
    F: EngineFactory + Send + 'static,
{
    let threads = resolve_with(requested_threads, capacity);
    if threads == 1 || job_count <= 1 {
        Box::new(SequentialStrategy::new(factory))
    } else {
        Box::new(PoolCoordinator::with_capacity(
            threads as i64,
            factory,
            capacity,
        ))
    }
}
