//! Thread-count validation against host capacity.
//!
//! Capacity is an injected capability so the clamp can be tested with
//! fixed processor counts.

use std::num::NonZeroUsize;
use tracing::warn;

use crate::telemetry::metrics;

/// Source of the host's processing-unit count.
pub trait HostCapacity: Send + Sync {
    /// Processing units available right now. Always at least 1.
    fn available(&self) -> usize;
}

/// Reads `std::thread::available_parallelism`, falling back to 1 when the
/// platform cannot report it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCapacity;

impl HostCapacity for SystemCapacity {
    fn available(&self) -> usize {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }
}

/// A fixed processor count.
#[derive(Debug, Clone, Copy)]
pub struct FixedCapacity(pub usize);

impl HostCapacity for FixedCapacity {
    fn available(&self) -> usize {
        self.0.max(1)
    }
}

/// Clamp a requested thread count into `[1, available]`.
///
/// Out-of-range requests are corrected with a warning, never rejected.
pub fn resolve_thread_count(requested: i64, available: usize) -> usize {
    let available = available.max(1);
    if requested < 1 {
        warn!(
            requested,
            "invalid number of threads, setting number of threads to 1"
        );
        metrics::thread_count_corrections().add(1, &[]);
        1
    } else if requested as u64 > available as u64 {
        warn!(
            requested,
            available,
            "configured number of threads exceeds available processors, clamping"
        );
        metrics::thread_count_corrections().add(1, &[]);
        available
    } else {
        requested as usize
    }
}

/// [`resolve_thread_count`] against a capacity source.
pub fn resolve_with(requested: i64, capacity: &dyn HostCapacity) -> usize {
    resolve_thread_count(requested, capacity.available())
}
