//! Span helpers for pool runs.

use tracing::Span;
use uuid::Uuid;

/// Span covering one `execute` call.
pub fn start_run_span(run_id: &Uuid, threads: usize, jobs: usize) -> Span {
    tracing::info_span!(
        "pool.execute",
        "pool.run_id" = %run_id,
        "pool.threads" = threads,
        "pool.jobs" = jobs,
    )
}

/// Span for one worker thread, parented to the run span.
///
/// Worker threads do not inherit the spawning thread's current span, so
/// the parent is explicit.
pub fn start_worker_span(run: &Span, worker: &str) -> Span {
    tracing::debug_span!(parent: run, "pool.worker", "pool.worker" = worker)
}
