//! Metric instrument factories for jobpool.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a provider the instruments are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("jobpool")
}

/// Counter: jobs transformed successfully.
/// Labels: `worker`.
pub fn jobs_transformed() -> Counter<u64> {
    meter()
        .u64_counter("jobpool.jobs.transformed")
        .with_description("Number of jobs transformed")
        .build()
}

/// Counter: jobs whose transform failed.
/// Labels: `worker`.
pub fn jobs_failed() -> Counter<u64> {
    meter()
        .u64_counter("jobpool.jobs.failed")
        .with_description("Number of failed transforms")
        .build()
}

/// Counter: requested thread counts that had to be clamped.
pub fn thread_count_corrections() -> Counter<u64> {
    meter()
        .u64_counter("jobpool.threads.corrections")
        .with_description("Requested thread counts corrected into range")
        .build()
}

/// Histogram: time spent in a single transform.
/// Labels: `worker`.
pub fn transform_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("jobpool.transform.duration_ms")
        .with_description("Transform duration in milliseconds")
        .with_unit("ms")
        .build()
}
