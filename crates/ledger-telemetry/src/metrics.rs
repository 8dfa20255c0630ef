//! Prometheus metrics for the node runtime.
//!
//! Node-level series live in [`REGISTRY`] and follow `dl_node_<metric>_<unit>`.
//! Component crates built with their `metrics` feature register into the
//! prometheus default registry; [`gather_metrics`] encodes both.
//!
//! ## Metric Types
//!
//! - **Counter**: mined units, mining failures, scheduler ticks, memo evictions
//! - **Gauge**: chain height, units by status, total scientific value, fault rate
//! - **Histogram**: end-to-end mining latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use shared_types::LedgerStats;

use crate::TelemetryError;

lazy_static! {
    /// Registry for node-level metrics
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MINING PIPELINE
    // =========================================================================

    /// Units mined and registered with consensus, by work type
    pub static ref UNITS_MINED: IntCounterVec = IntCounterVec::new(
        Opts::new("dl_node_units_mined_total", "Work units mined and registered"),
        &["work_type"]
    ).expect("metric creation failed");

    /// Mining attempts that failed, by stage
    pub static ref MINING_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("dl_node_mining_failures_total", "Failed mining attempts"),
        &["stage"]  // compute, valuate, sign, register
    ).expect("metric creation failed");

    /// Compute, valuate, sign and register latency
    pub static ref MINING_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "dl_node_mining_duration_seconds",
            "Time from mining request to consensus registration"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Blocks in the chain
    pub static ref CHAIN_HEIGHT: IntGauge = IntGauge::new(
        "dl_node_chain_blocks",
        "Number of blocks in the ledger"
    ).expect("metric creation failed");

    /// Work units by status
    pub static ref UNITS_BY_STATUS: GaugeVec = GaugeVec::new(
        Opts::new("dl_node_work_units", "Work units in the ledger by status"),
        &["status"]
    ).expect("metric creation failed");

    /// Sum of sealed scientific value
    pub static ref TOTAL_SCIENTIFIC_VALUE: Gauge = Gauge::new(
        "dl_node_scientific_value_total",
        "Total scientific value sealed into blocks"
    ).expect("metric creation failed");

    // =========================================================================
    // SCHEDULER
    // =========================================================================

    /// Scheduler loop iterations, by task
    pub static ref SCHEDULER_TICKS: IntCounterVec = IntCounterVec::new(
        Opts::new("dl_node_scheduler_ticks_total", "Scheduled task iterations"),
        &["task"]
    ).expect("metric creation failed");

    /// Computation failure ratio over the monitor window
    pub static ref FAULT_RATE: Gauge = Gauge::new(
        "dl_node_computation_fault_rate",
        "Ratio of failed computations in the rolling window"
    ).expect("metric creation failed");

    /// Memoised primality entries dropped by cache maintenance
    pub static ref MEMO_EVICTIONS: IntCounter = IntCounter::new(
        "dl_node_memo_evictions_total",
        "Memoised primality entries evicted"
    ).expect("metric creation failed");
}

/// Register every node-level metric with [`REGISTRY`].
///
/// Fails with `MetricsInit` when called twice.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(UNITS_MINED.clone()),
        Box::new(MINING_FAILURES.clone()),
        Box::new(MINING_DURATION.clone()),
        Box::new(CHAIN_HEIGHT.clone()),
        Box::new(UNITS_BY_STATUS.clone()),
        Box::new(TOTAL_SCIENTIFIC_VALUE.clone()),
        Box::new(SCHEDULER_TICKS.clone()),
        Box::new(FAULT_RATE.clone()),
        Box::new(MEMO_EVICTIONS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode node-level and component metrics in Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let mut families = REGISTRY.gather();
    families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Publish ledger aggregates as gauges.
pub fn record_ledger_stats(stats: &LedgerStats) {
    CHAIN_HEIGHT.set(i64::try_from(stats.block_count).unwrap_or(i64::MAX));
    for (status, count) in [
        ("PENDING", stats.pending),
        ("UNDER_REVIEW", stats.under_review),
        ("APPROVED", stats.approved),
        ("REJECTED", stats.rejected),
        ("FINALIZED", stats.finalized),
    ] {
        UNITS_BY_STATUS.with_label_values(&[status]).set(count as f64);
    }
    TOTAL_SCIENTIFIC_VALUE.set(stats.total_scientific_value);
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
