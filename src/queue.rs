//! Shared work queue.
//!
//! Seeded once, then drained concurrently by workers. Backed by a lock-free
//! `SegQueue`, so each `poll` hands a job to exactly one caller.

use crate::job::Job;
use crossbeam_queue::SegQueue;
use std::sync::atomic::{AtomicBool, Ordering};

/// Multi-consumer pool of pending jobs. No re-insertion once workers start.
#[derive(Debug, Default)]
pub struct WorkQueue {
    jobs: SegQueue<Job>,
    halted: AtomicBool,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue already holding `jobs`.
    pub fn seeded(jobs: impl IntoIterator<Item = Job>) -> Self {
        let mut queue = Self::new();
        queue.seed(jobs);
        queue
    }

    /// Load pending jobs. Takes `&mut self`: seeding cannot overlap polling.
    pub fn seed(&mut self, jobs: impl IntoIterator<Item = Job>) {
        for job in jobs {
            self.jobs.push(job);
        }
    }

    /// Remove and return one arbitrary job, or `None` once drained or halted.
    pub fn poll(&self) -> Option<Job> {
        if self.halted.load(Ordering::Acquire) {
            return None;
        }
        self.jobs.pop()
    }

    /// Stop handing out jobs. Returns the number left unclaimed.
    ///
    /// Used when a worker fails: siblings finish the job in hand and stop.
    pub fn halt(&self) -> usize {
        self.halted.store(true, Ordering::Release);
        let mut abandoned = 0;
        while self.jobs.pop().is_some() {
            abandoned += 1;
        }
        abandoned
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Jobs still waiting. Racy while workers are polling.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
