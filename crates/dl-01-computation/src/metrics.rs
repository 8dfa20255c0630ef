//! # Computation Metrics
//!
//! Enable with the `metrics` feature:
//! ```toml
//! dl-01-computation = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `computation_jobs_total{work_type, outcome}` - Jobs finished on the pool
//! - `computation_latency_seconds` - Wall time from submit to result

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Finished jobs by work type and outcome
    pub static ref COMPUTATION_JOBS: IntCounterVec = register_int_counter_vec!(
        "computation_jobs_total",
        "Total computation jobs finished on the worker pool",
        &["work_type", "outcome"]
    )
    .expect("Failed to create COMPUTATION_JOBS metric");

    /// Submit-to-result latency
    pub static ref COMPUTATION_LATENCY: Histogram = register_histogram!(
        "computation_latency_seconds",
        "Time from submission to result in seconds",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create COMPUTATION_LATENCY metric");
}

/// Record a finished job
#[cfg(feature = "metrics")]
pub fn record_computation(work_type: &str, outcome: &str) {
    COMPUTATION_JOBS.with_label_values(&[work_type, outcome]).inc();
}

/// Record submit-to-result latency
#[cfg(feature = "metrics")]
pub fn record_computation_latency(seconds: f64) {
    COMPUTATION_LATENCY.observe(seconds);
}

#[cfg(not(feature = "metrics"))]
pub fn record_computation(_work_type: &str, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_computation_latency(_seconds: f64) {}
