//! Node-level errors

use shared_types::{AssemblyError, RepositoryError};
use thiserror::Error;

use crate::container::ConfigError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Computation failed: {0}")]
    Computation(#[from] dl_01_computation::ComputationError),

    #[error("Valuation failed: {0}")]
    Valuation(#[from] dl_02_valuation::ValuationError),

    #[error("Signing failed: {0}")]
    Signature(#[from] dl_03_work_signature::SignatureError),

    #[error("Consensus refused: {0}")]
    Consensus(#[from] dl_04_consensus::ConsensusError),

    #[error("Audit failed: {0}")]
    Integrity(#[from] dl_05_integrity::IntegrityError),

    #[error("Block assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type NodeResult<T> = Result<T, NodeError>;
