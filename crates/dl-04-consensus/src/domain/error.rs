//! Error types for the consensus subsystem

use shared_types::{RepositoryError, ValidatorId, WorkId, WorkStatus};

/// Consensus error types
///
/// `DuplicateVote` and `StaleWork` are expected, recoverable conditions and
/// are reported to the caller rather than escalated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsensusError {
    #[error("Unknown work unit: {0}")]
    UnknownWork(WorkId),

    #[error("Duplicate vote from validator {validator} on {work_id}")]
    DuplicateVote { work_id: WorkId, validator: ValidatorId },

    #[error("Work unit {work_id} is already {status}")]
    StaleWork { work_id: WorkId, status: WorkStatus },

    #[error("Quorum not reached for {work_id}: status is {status}")]
    QuorumNotReached { work_id: WorkId, status: WorkStatus },

    #[error("Work unit already registered: {0}")]
    DuplicateWork(WorkId),

    #[error("Work unit is not signed: {0}")]
    UnsignedWork(WorkId),

    #[error("Invalid signature on {work_id}: {reason}")]
    InvalidSignature { work_id: WorkId, reason: String },

    #[error("Validator not eligible to vote: {0}")]
    UnknownValidator(ValidatorId),

    #[error("Validator {validator} claimed stake {claimed}, registered with {registered}")]
    StakeExceedsRegistration {
        validator: ValidatorId,
        claimed: u64,
        registered: u64,
    },

    #[error("Empty validator id")]
    EmptyValidator,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ConsensusError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ConsensusError::UnknownWork(_) => "unknown_work",
            ConsensusError::DuplicateVote { .. } => "duplicate_vote",
            ConsensusError::StaleWork { .. } => "stale_work",
            ConsensusError::QuorumNotReached { .. } => "quorum_not_reached",
            ConsensusError::DuplicateWork(_) => "duplicate_work",
            ConsensusError::UnsignedWork(_) => "unsigned_work",
            ConsensusError::InvalidSignature { .. } => "invalid_signature",
            ConsensusError::UnknownValidator(_) => "unknown_validator",
            ConsensusError::StakeExceedsRegistration { .. } => "stake_exceeds_registration",
            ConsensusError::EmptyValidator => "empty_validator",
            ConsensusError::Repository(_) => "repository",
        }
    }
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
