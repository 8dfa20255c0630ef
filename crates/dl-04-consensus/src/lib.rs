//! # dl-04-consensus
//!
//! Validator consensus engine for work units.
//!
//! ## State machine
//!
//! ```text
//! PENDING ──first vote──→ UNDER_REVIEW ──┬──→ APPROVED ──seal──→ FINALIZED
//!                                        └──→ REJECTED
//! ```
//!
//! - APPROVED once `approve_stake / total_stake >= consensus_threshold` and at
//!   least `min_validators` distinct validators voted.
//! - REJECTED once the rejecting share reaches `rejection_quorum` with the
//!   same voter quorum, or when a bounded validator set can no longer lift
//!   approval over the threshold.
//! - Votes on decided units fail with `StaleWork`; repeat votes fail with
//!   `DuplicateVote` and leave the tally untouched.
//!
//! ## Concurrency
//!
//! Each unit has its own lock, so votes on different units proceed in
//! parallel while votes on the same unit are serialized.

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{
    BroadcastEventPublisher, InMemoryEventPublisher, OpenValidatorDirectory,
    StaticValidatorDirectory, ValidatorInfo,
};
pub use domain::{
    ConsensusConfig, ConsensusError, ConsensusResult, ConsensusStatus, EligibleSet, VoteOutcome,
    VoteTally,
};
pub use events::ConsensusEvent;
pub use ports::{ConsensusApi, ConsensusEventPublisher, ValidatorDirectory, WorkVerifier};
pub use service::{ConsensusDependencies, ConsensusService};
