//! # Block Assembly Metrics
//!
//! - `assembly_blocks_appended_total` - Counter of appended blocks
//! - `assembly_units_sealed_total` - Counter of work units sealed into blocks
//! - `assembly_duration_seconds` - Histogram of nonce search plus append time

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BLOCKS_APPENDED: IntCounter = register_int_counter!(
        "assembly_blocks_appended_total",
        "Total number of blocks appended to the ledger"
    )
    .expect("Failed to create BLOCKS_APPENDED metric");

    pub static ref UNITS_SEALED: IntCounter = register_int_counter!(
        "assembly_units_sealed_total",
        "Total number of work units sealed into blocks"
    )
    .expect("Failed to create UNITS_SEALED metric");

    pub static ref ASSEMBLY_DURATION: Histogram = register_histogram!(
        "assembly_duration_seconds",
        "Time spent searching a nonce and appending a block",
        vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]
    )
    .expect("Failed to create ASSEMBLY_DURATION metric");
}

#[cfg(feature = "metrics")]
pub fn record_block_appended(units: u64, seconds: f64) {
    BLOCKS_APPENDED.inc();
    UNITS_SEALED.inc_by(units);
    ASSEMBLY_DURATION.observe(seconds);
}

#[cfg(not(feature = "metrics"))]
pub fn record_block_appended(_units: u64, _seconds: f64) {}
