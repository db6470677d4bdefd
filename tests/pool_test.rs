//! Integration tests for the pool coordinator.

use jobpool::error::{Error, Result};
use jobpool::job::Job;
use jobpool::pool::PoolCoordinator;
use jobpool::threads::FixedCapacity;
use jobpool::TransformEngine;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::Duration;

/// Upper-cases the source. Fails if used from a thread other than the one
/// that built it, or on any source listed in `poison`.
struct Upper<'a> {
    built_on: ThreadId,
    seen: &'a Mutex<Vec<String>>,
    poison: &'a [&'a str],
}

impl TransformEngine for Upper<'_> {
    fn transform(&mut self, job: &Job) -> Result<String> {
        if thread::current().id() != self.built_on {
            return Err(Error::Other("engine crossed threads".to_string()));
        }
        if self.poison.contains(&job.source.as_str()) {
            return Err(Error::transform(&job.source, "poisoned input"));
        }
        if job.source.ends_with('7') {
            thread::sleep(Duration::from_millis(1));
        }
        self.seen.lock().unwrap().push(job.source.clone());
        Ok(job.source.to_uppercase())
    }
}

struct Harness {
    engines: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            engines: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn pool<'a>(
        &'a self,
        threads: i64,
        available: usize,
        poison: &'a [&'a str],
    ) -> PoolCoordinator<impl Fn() -> Result<Upper<'a>> + Sync + 'a> {
        let factory = move || -> Result<Upper<'a>> {
            self.engines.fetch_add(1, Ordering::SeqCst);
            Ok(Upper {
                built_on: thread::current().id(),
                seen: &self.seen,
                poison,
            })
        };
        PoolCoordinator::with_capacity(threads, factory, &FixedCapacity(available))
    }
}

fn jobs(n: usize) -> HashSet<Job> {
    (0..n).map(|i| Job::new(format!("job-{i}"))).collect()
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

#[test]
fn every_job_completed_once() {
    let harness = Harness::new();
    let pool = harness.pool(4, 8, &[]);

    let input = jobs(50);
    let output = pool.execute(input.clone()).unwrap();

    assert_eq!(output.len(), input.len());
    let sources: HashSet<_> = output.iter().map(|j| j.source.clone()).collect();
    let expected: HashSet<_> = input.iter().map(|j| j.source.clone()).collect();
    assert_eq!(sources, expected);
    for job in &output {
        assert_eq!(job.result.as_deref(), Some(job.source.to_uppercase().as_str()));
    }
}

#[test]
fn thousand_jobs_eight_workers_no_duplicates_no_omissions() {
    let harness = Harness::new();
    let pool = harness.pool(8, 8, &[]);
    assert_eq!(pool.threads(), 8);

    let output = pool.execute(jobs(1000)).unwrap();
    assert_eq!(output.len(), 1000);

    let seen = harness.seen.lock().unwrap();
    assert_eq!(seen.len(), 1000, "each job transformed exactly once");
    let unique: HashSet<_> = seen.iter().collect();
    assert_eq!(unique.len(), 1000);

    assert_eq!(harness.engines.load(Ordering::SeqCst), 8);
}

#[test]
fn empty_job_set_returns_empty_and_builds_no_engine() {
    let harness = Harness::new();
    let pool = harness.pool(4, 8, &[]);

    let output = pool.execute(HashSet::new()).unwrap();
    assert!(output.is_empty());
    assert_eq!(harness.engines.load(Ordering::SeqCst), 0);
}

#[test]
fn single_job_single_thread() {
    let harness = Harness::new();
    let pool = harness.pool(1, 8, &[]);

    let input: HashSet<Job> = [Job::new("a.js")].into_iter().collect();
    let output = pool.execute(input).unwrap();

    let expected: HashSet<Job> = [Job::new("a.js").complete("A.JS")].into_iter().collect();
    assert_eq!(output, expected);
    assert_eq!(harness.engines.load(Ordering::SeqCst), 1);
}

#[test]
fn more_workers_than_jobs() {
    let harness = Harness::new();
    let pool = harness.pool(8, 8, &[]);

    let output = pool.execute(jobs(3)).unwrap();
    assert_eq!(output.len(), 3);
    // Every launched worker builds its engine, even if it finds no work.
    assert_eq!(harness.engines.load(Ordering::SeqCst), 8);
}

#[test]
fn repeated_runs_cover_same_sources() {
    let harness = Harness::new();
    let pool = harness.pool(3, 8, &[]);

    let first = pool.execute(jobs(40)).unwrap();
    let second = pool.execute(jobs(40)).unwrap();

    assert_eq!(first.len(), second.len());
    assert_eq!(first, second);
}

#[test]
fn completed_input_job_rejected_before_work_starts() {
    let harness = Harness::new();
    let pool = harness.pool(2, 8, &[]);

    let input: HashSet<Job> = [Job::new("a.js"), Job::new("a.js").complete("stale")]
        .into_iter()
        .collect();
    assert_eq!(input.len(), 2);

    let err = pool.execute(input).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {err:?}");
    assert_eq!(harness.engines.load(Ordering::SeqCst), 0);
    assert!(harness.seen.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Thread count
// ---------------------------------------------------------------------------

#[test]
fn requested_threads_clamped_to_capacity() {
    let harness = Harness::new();
    assert_eq!(harness.pool(100, 8, &[]).threads(), 8);
    assert_eq!(harness.pool(0, 8, &[]).threads(), 1);
    assert_eq!(harness.pool(-3, 8, &[]).threads(), 1);
    assert_eq!(harness.pool(4, 8, &[]).threads(), 4);
}

#[test]
fn launches_exactly_resolved_thread_count() {
    let harness = Harness::new();
    let pool = harness.pool(100, 3, &[]);

    pool.execute(jobs(30)).unwrap();
    assert_eq!(harness.engines.load(Ordering::SeqCst), 3);
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[test]
fn transform_failure_fails_the_call() {
    let harness = Harness::new();
    let poison = ["job-17"];
    let pool = harness.pool(4, 8, &poison);

    let err = pool.execute(jobs(100)).unwrap_err();
    match err {
        Error::Transform { job, reason } => {
            assert_eq!(job, "job-17");
            assert_eq!(reason, "poisoned input");
        }
        other => panic!("expected Transform, got {other:?}"),
    }
}

#[test]
fn failure_halts_sibling_workers() {
    /// The first engine built fails on its first job; the rest are slow.
    struct FirstFails<'a> {
        fail: bool,
        seen: &'a Mutex<Vec<String>>,
    }

    impl TransformEngine for FirstFails<'_> {
        fn transform(&mut self, job: &Job) -> Result<String> {
            if self.fail {
                return Err(Error::transform(&job.source, "first engine"));
            }
            thread::sleep(Duration::from_millis(2));
            self.seen.lock().unwrap().push(job.source.clone());
            Ok(job.source.clone())
        }
    }

    let built = AtomicUsize::new(0);
    let seen = Mutex::new(Vec::new());
    let factory = || -> Result<FirstFails<'_>> {
        Ok(FirstFails {
            fail: built.fetch_add(1, Ordering::SeqCst) == 0,
            seen: &seen,
        })
    };
    let pool = PoolCoordinator::with_capacity(2, factory, &FixedCapacity(2));

    assert!(pool.execute(jobs(500)).is_err());
    // Without the halt the healthy sibling would drain all 499 remaining jobs.
    assert!(seen.lock().unwrap().len() < 499);
}

#[test]
fn engine_construction_failure_fails_the_call() {
    let factory = || -> Result<Box<dyn TransformEngine>> {
        Err(Error::Engine("no runtime".to_string()))
    };
    let pool = PoolCoordinator::with_capacity(2, factory, &FixedCapacity(4));

    let err = pool.execute(jobs(10)).unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
}

#[test]
fn worker_panic_is_reported() {
    struct Panics;
    impl TransformEngine for Panics {
        fn transform(&mut self, _job: &Job) -> Result<String> {
            panic!("engine bug");
        }
    }

    let factory = || -> Result<Panics> { Ok(Panics) };
    let pool = PoolCoordinator::with_capacity(2, factory, &FixedCapacity(4));
    let err = pool.execute(jobs(5)).unwrap_err();
    assert!(matches!(err, Error::WorkerPanicked { .. }));
}
