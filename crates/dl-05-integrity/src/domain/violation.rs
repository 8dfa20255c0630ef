//! Structural violations found by a sweep.
//!
//! Violations are data conditions collected into reports. They never
//! interrupt ledger operation.

use serde::{Deserialize, Serialize};
use shared_types::{ValidatorId, WorkId};

/// Grouping used for recommendations and enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationCategory {
    ChainStructure,
    BlockValue,
    IncompleteWork,
    UnderValidated,
    Reproducibility,
    ValidationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum IntegrityViolation {
    #[error("Block {index} is missing a hash field")]
    MissingHash { index: u64 },

    #[error("Block {index} has non-positive scientific value {value}")]
    NonPositiveBlockValue { index: u64, value: f64 },

    #[error("Block {index} has zero difficulty")]
    ZeroBlockDifficulty { index: u64 },

    #[error("Block at position {position} carries index {index}")]
    IndexGap { position: usize, index: u64 },

    #[error("Block {index} does not link to its predecessor")]
    BrokenLinkage { index: u64 },

    #[error("Block {index} hash does not match its header")]
    HashMismatch { index: u64 },

    #[error("Block {index} hash does not meet its difficulty")]
    InsufficientWork { index: u64 },

    #[error("Block {index} merkle root does not match its work units")]
    MerkleMismatch { index: u64 },

    #[error("Block {index} references unknown {work_id}")]
    UnknownWorkReference { index: u64, work_id: WorkId },

    #[error("Block {index} includes {work_id} which is not finalized")]
    UnfinalizedInclusion { index: u64, work_id: WorkId },

    #[error("Block {index} includes {work_id} already sealed in an earlier block")]
    DuplicateInclusion { index: u64, work_id: WorkId },

    #[error("{0} is not signed")]
    MissingSignature(WorkId),

    #[error("{0} signature does not match its contents")]
    SignatureMismatch(WorkId),

    #[error("{0} result does not reproduce")]
    ResultMismatch(WorkId),

    #[error("{work_id} has non-positive scientific value {value}")]
    NonPositiveWorkValue { work_id: WorkId, value: f64 },

    #[error("{0} has zero difficulty")]
    ZeroWorkDifficulty(WorkId),

    #[error("{0} has no worker")]
    MissingWorker(WorkId),

    #[error("{work_id} has {validations} of {required} required validations")]
    UnderValidated {
        work_id: WorkId,
        validations: usize,
        required: usize,
    },

    #[error("Validation by {validator} references unknown {work_id}")]
    OrphanValidation { work_id: WorkId, validator: ValidatorId },

    #[error("Validation on {0} has no validator")]
    EmptyValidator(WorkId),

    #[error("Duplicate validation by {validator} on {work_id}")]
    DuplicateValidation { work_id: WorkId, validator: ValidatorId },
}

impl IntegrityViolation {
    pub fn category(&self) -> ViolationCategory {
        use IntegrityViolation::*;
        match self {
            MissingHash { .. }
            | IndexGap { .. }
            | BrokenLinkage { .. }
            | HashMismatch { .. }
            | InsufficientWork { .. }
            | MerkleMismatch { .. }
            | UnknownWorkReference { .. }
            | UnfinalizedInclusion { .. }
            | DuplicateInclusion { .. }
            | ZeroBlockDifficulty { .. } => ViolationCategory::ChainStructure,
            NonPositiveBlockValue { .. } => ViolationCategory::BlockValue,
            MissingSignature(_)
            | NonPositiveWorkValue { .. }
            | ZeroWorkDifficulty(_)
            | MissingWorker(_) => ViolationCategory::IncompleteWork,
            UnderValidated { .. } => ViolationCategory::UnderValidated,
            SignatureMismatch(_) | ResultMismatch(_) => ViolationCategory::Reproducibility,
            OrphanValidation { .. } | EmptyValidator(_) | DuplicateValidation { .. } => {
                ViolationCategory::ValidationRecord
            }
        }
    }
}
