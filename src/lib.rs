//! # jobpool
//!
//! Bounded-parallelism job processing. A fixed number of worker threads
//! drain a shared queue, each with its own stateful transform engine, and
//! the per-worker results are merged once every worker has finished.

pub mod config;
pub mod engine;
pub mod error;
pub mod job;
pub mod pool;
pub mod queue;
pub mod report;
pub mod strategy;
pub mod telemetry;
pub mod threads;
pub mod worker;

pub use engine::{EngineFactory, TransformEngine};
pub use error::{Error, Result};
pub use job::Job;
pub use pool::PoolCoordinator;
pub use queue::WorkQueue;
pub use threads::resolve_thread_count;
