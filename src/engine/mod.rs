//! Transform engines and the factories that build them.
//!
//! An engine is stateful and not required to be thread-safe. Each worker
//! asks the factory for its own engine on its own thread and keeps it for
//! the worker's lifetime.

pub mod command;

use crate::error::Result;
use crate::job::Job;

pub use command::{CommandEngine, CommandSpec};

/// Converts one job's input into its output.
pub trait TransformEngine {
    /// Produce the result for `job`. Errors are fatal to the whole run.
    fn transform(&mut self, job: &Job) -> Result<String>;
}

impl<E: TransformEngine + ?Sized> TransformEngine for Box<E> {
    fn transform(&mut self, job: &Job) -> Result<String> {
        (**self).transform(job)
    }
}

/// Builds a fresh engine on demand. Shared by reference across workers.
pub trait EngineFactory: Sync {
    type Engine: TransformEngine;

    fn create(&self) -> Result<Self::Engine>;
}

impl<F, E> EngineFactory for F
where
    F: Fn() -> Result<E> + Sync,
    E: TransformEngine,
{
    type Engine = E;

    fn create(&self) -> Result<E> {
        self()
    }
}
