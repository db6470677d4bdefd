//! Integration tests for the shared work queue.

use jobpool::job::Job;
use jobpool::queue::WorkQueue;
use std::collections::HashSet;
use std::thread;

fn seeded(n: usize) -> WorkQueue {
    WorkQueue::seeded((0..n).map(|i| Job::new(format!("src-{i}"))))
}

#[test]
fn poll_returns_none_when_empty() {
    let queue = WorkQueue::new();
    assert!(queue.poll().is_none());
    assert!(queue.is_empty());
}

#[test]
fn seed_then_drain() {
    let mut queue = WorkQueue::new();
    queue.seed([Job::new("a.js"), Job::new("b.js")]);
    assert_eq!(queue.len(), 2);

    let mut drained = HashSet::new();
    while let Some(job) = queue.poll() {
        drained.insert(job.source);
    }
    assert_eq!(drained, HashSet::from(["a.js".to_string(), "b.js".to_string()]));
    assert!(queue.poll().is_none());
}

#[test]
fn concurrent_pollers_each_job_once() {
    let queue = seeded(10_000);

    let claimed: Vec<Vec<Job>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let mut mine = Vec::new();
                    while let Some(job) = queue.poll() {
                        mine.push(job);
                    }
                    mine
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let total: usize = claimed.iter().map(Vec::len).sum();
    assert_eq!(total, 10_000);
    let unique: HashSet<_> = claimed.iter().flatten().map(|j| &j.source).collect();
    assert_eq!(unique.len(), 10_000);
    assert!(queue.is_empty());
}

#[test]
fn halt_abandons_remaining_jobs() {
    let queue = seeded(5);
    assert!(queue.poll().is_some());

    let abandoned = queue.halt();
    assert_eq!(abandoned, 4);
    assert!(queue.is_halted());
    assert!(queue.poll().is_none());
    assert!(queue.is_empty());
}
