//! # Consensus Metrics
//!
//! Enable with the `metrics` feature:
//! ```toml
//! dl-04-consensus = { workspace = true, features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `consensus_votes_accepted_total` - Counter of accepted votes
//! - `consensus_votes_rejected_total` - Counter of refused votes (by reason)
//! - `consensus_units_decided_total` - Counter of decided units (by outcome)
//! - `consensus_units_registered_total` - Counter of admitted units

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref VOTES_ACCEPTED: IntCounter = register_int_counter!(
        "consensus_votes_accepted_total",
        "Total number of accepted validator votes"
    )
    .expect("Failed to create VOTES_ACCEPTED metric");

    pub static ref VOTES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "consensus_votes_rejected_total",
        "Total number of refused validator votes",
        &["reason"]
    )
    .expect("Failed to create VOTES_REJECTED metric");

    pub static ref UNITS_DECIDED: IntCounterVec = register_int_counter_vec!(
        "consensus_units_decided_total",
        "Total number of work units decided",
        &["outcome"]
    )
    .expect("Failed to create UNITS_DECIDED metric");

    pub static ref UNITS_REGISTERED: IntCounter = register_int_counter!(
        "consensus_units_registered_total",
        "Total number of work units admitted to consensus"
    )
    .expect("Failed to create UNITS_REGISTERED metric");
}

#[cfg(feature = "metrics")]
pub fn record_vote_accepted() {
    VOTES_ACCEPTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_vote_rejected(reason: &str) {
    VOTES_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_unit_decided(outcome: &str) {
    UNITS_DECIDED.with_label_values(&[outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_unit_registered() {
    UNITS_REGISTERED.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_vote_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_unit_decided(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_unit_registered() {}
