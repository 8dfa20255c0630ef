//! Consensus domain: configuration, errors, the stake tally and the
//! per-unit vote record.

mod config;
mod error;
mod tally;

pub use config::ConsensusConfig;
pub use error::{ConsensusError, ConsensusResult};
pub use tally::{EligibleSet, VoteTally};

use serde::{Deserialize, Serialize};
use shared_types::{Validation, ValidatorId, WorkId, WorkStatus, WorkUnit};
use std::collections::HashSet;

/// Result of an accepted vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub work_id: WorkId,
    pub status: WorkStatus,
    pub approval_rate: f64,
    pub voters: usize,
    /// True only for the vote that performed the deciding transition.
    pub decided: bool,
}

/// Consensus view of one work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusStatus {
    pub work_id: WorkId,
    pub status: WorkStatus,
    pub approval_rate: f64,
    pub consensus_strength: f64,
    pub validator_diversity: f64,
    pub voters: usize,
    pub approve_stake: u64,
    pub total_stake: u64,
}

/// Votes and current state of one registered unit.
#[derive(Debug, Clone)]
pub struct WorkEntry {
    pub unit: WorkUnit,
    pub tally: VoteTally,
    pub voters: HashSet<ValidatorId>,
    pub votes: Vec<Validation>,
}

impl WorkEntry {
    pub fn new(unit: WorkUnit) -> Self {
        Self {
            unit,
            tally: VoteTally::default(),
            voters: HashSet::new(),
            votes: Vec::new(),
        }
    }

    pub fn status(&self) -> WorkStatus {
        self.unit.status
    }

    pub fn snapshot_status(&self, min_validators: usize) -> ConsensusStatus {
        ConsensusStatus {
            work_id: self.unit.id,
            status: self.unit.status,
            approval_rate: self.tally.approval_rate(),
            consensus_strength: self.tally.consensus_strength(),
            validator_diversity: self.tally.validator_diversity(min_validators),
            voters: self.tally.voters,
            approve_stake: self.tally.approve_stake,
            total_stake: self.tally.total_stake(),
        }
    }
}
