//! # Error Types
//!
//! Errors raised by the collaborator ports defined in this crate.

use thiserror::Error;

use crate::entities::WorkId;

/// Errors from a [`crate::LedgerRepository`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RepositoryError {
    /// Block index does not follow the current tip.
    #[error("Block index out of sequence: expected {expected}, got {actual}")]
    IndexMismatch { expected: u64, actual: u64 },

    /// Block previous hash does not match the tip's hash.
    #[error("Previous hash mismatch at block {index}")]
    LinkageMismatch { index: u64 },

    /// Referenced work unit does not exist.
    #[error("Work unit not found: {0}")]
    WorkNotFound(WorkId),

    /// Backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors from a [`crate::BlockAssembler`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssemblyError {
    #[error("No finalized work units to assemble")]
    EmptyBatch,

    #[error("Work unit {0} is not FINALIZED")]
    NotFinalized(WorkId),

    #[error("Work unit {0} appears more than once in the batch")]
    DuplicateWork(WorkId),

    #[error("Work unit {0} is already sealed in a block")]
    AlreadySealed(WorkId),

    #[error("Work unit {0} is unsigned")]
    UnsignedWork(WorkId),

    #[error("Block difficulty must be within 1..=256 leading zero bits, got {0}")]
    InvalidDifficulty(u32),

    #[error("No nonce within {attempts} attempts meets {difficulty} leading zero bits")]
    NonceExhausted { difficulty: u32, attempts: u64 },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
