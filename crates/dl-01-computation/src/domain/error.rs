//! Error types for the computation engine

use shared_types::{WorkType, MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Computation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("Invalid difficulty {difficulty}: must be within {MIN_DIFFICULTY}..={MAX_DIFFICULTY}")]
    InvalidDifficulty { difficulty: u32 },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Parameters for {actual} supplied to {expected} computation")]
    WorkTypeMismatch { expected: WorkType, actual: WorkType },

    #[error("No entropy source supplied to derive {0}")]
    MissingEntropy(&'static str),

    #[error("Computation exceeded its {timeout_ms}ms budget")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to build worker pool: {0}")]
    PoolInit(String),

    #[error("Worker pool is shut down")]
    PoolShutdown,

    #[error("Worker terminated before returning a result")]
    WorkerPanicked,
}

/// Result type for computation operations
pub type ComputationResult<T> = Result<T, ComputationError>;
