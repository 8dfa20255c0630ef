//! # Integrity Metrics
//!
//! - `integrity_score` - Gauge of the latest integrity score
//! - `integrity_compliance_score` - Gauge of the latest compliance score
//! - `integrity_sweeps_total` - Counter of completed sweeps
//! - `integrity_alerts_total` - Counter of alerts raised (by kind)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_int_counter, register_int_counter_vec, Gauge, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref INTEGRITY_SCORE: Gauge = register_gauge!(
        "integrity_score",
        "Integrity score of the most recent sweep"
    )
    .expect("Failed to create INTEGRITY_SCORE metric");

    pub static ref COMPLIANCE_SCORE: Gauge = register_gauge!(
        "integrity_compliance_score",
        "Compliance score of the most recent report"
    )
    .expect("Failed to create COMPLIANCE_SCORE metric");

    pub static ref SWEEPS_TOTAL: IntCounter = register_int_counter!(
        "integrity_sweeps_total",
        "Total number of completed integrity sweeps"
    )
    .expect("Failed to create SWEEPS_TOTAL metric");

    pub static ref ALERTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "integrity_alerts_total",
        "Total number of audit alerts raised",
        &["kind"]
    )
    .expect("Failed to create ALERTS_TOTAL metric");
}

#[cfg(feature = "metrics")]
pub fn record_sweep(score: f64) {
    SWEEPS_TOTAL.inc();
    INTEGRITY_SCORE.set(score);
}

#[cfg(feature = "metrics")]
pub fn record_compliance(score: f64) {
    COMPLIANCE_SCORE.set(score);
}

#[cfg(feature = "metrics")]
pub fn record_alert(kind: &str) {
    ALERTS_TOTAL.with_label_values(&[kind]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_sweep(_score: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_compliance(_score: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_alert(_kind: &str) {}
