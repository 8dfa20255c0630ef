//! # Core Domain Entities
//!
//! Work units, validator votes and blocks.
//!
//! ## Ownership
//!
//! - `WorkUnit` is produced by the computation pipeline and mutated only by
//!   consensus status transitions. It is never deleted.
//! - `Validation` references a unit by id; one per (work, validator) pair.
//! - `Block` is created by the block assembler and immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::work::{VerificationData, WorkParams, WorkResult, WorkType};

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// All-zero hash; also the genesis block's previous hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Identifier of a validator casting votes.
pub type ValidatorId = String;

/// Identifier of the worker that produced a unit.
pub type WorkerId = String;

/// Work unit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkId(pub u64);

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "work-{}", self.0)
    }
}

/// Consensus lifecycle of a work unit.
///
/// ```text
/// PENDING -> UNDER_REVIEW -> APPROVED -> FINALIZED
///                         \-> REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Finalized,
}

impl WorkStatus {
    /// True once a vote outcome has been decided.
    pub fn is_decided(&self) -> bool {
        matches!(self, WorkStatus::Approved | WorkStatus::Rejected | WorkStatus::Finalized)
    }

    /// True for units that passed consensus.
    pub fn is_accepted(&self) -> bool {
        matches!(self, WorkStatus::Approved | WorkStatus::Finalized)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkStatus::Pending => "PENDING",
            WorkStatus::UnderReview => "UNDER_REVIEW",
            WorkStatus::Approved => "APPROVED",
            WorkStatus::Rejected => "REJECTED",
            WorkStatus::Finalized => "FINALIZED",
        };
        f.write_str(s)
    }
}

/// One computed, valued and signed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub id: WorkId,
    pub work_type: WorkType,
    pub difficulty: u32,
    /// Resolved parameters (no derivable field left as `None`).
    pub params: WorkParams,
    /// Seed used to derive parameters, if any.
    pub seed: Option<u64>,
    pub result: WorkResult,
    pub verification: VerificationData,
    pub computational_cost: f64,
    pub energy_efficiency: f64,
    pub energy_consumed: f64,
    pub precision: f64,
    pub scientific_value: f64,
    pub worker_id: WorkerId,
    /// 64-char lowercase hex digest, absent until signed.
    pub signature: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: WorkStatus,
}

impl WorkUnit {
    pub fn is_signed(&self) -> bool {
        self.signature.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// A single stake-weighted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub work_id: WorkId,
    pub validator_id: ValidatorId,
    pub stake: u64,
    pub approve: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Append-only ledger entry aggregating finalized work units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: Hash,
    pub merkle_root: Hash,
    /// Required leading zero bits of `block_hash`.
    pub difficulty: u32,
    pub nonce: u64,
    pub block_hash: Hash,
    pub miner_id: String,
    pub total_scientific_value: f64,
    pub energy_consumed: f64,
    pub knowledge_created: u64,
    pub work_ids: Vec<WorkId>,
    pub timestamp: DateTime<Utc>,
}

impl Block {
    /// Hash of the header fields, excluding `block_hash` itself.
    pub fn compute_hash(&self) -> Hash {
        crate::hashing::block_header_hash(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}
