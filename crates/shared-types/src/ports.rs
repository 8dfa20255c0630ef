//! # Collaborator Ports
//!
//! Contracts the ledger core consumes but does not own.

use async_trait::async_trait;

use crate::audit::AuditEvent;
use crate::entities::{Block, Validation, WorkId, WorkUnit};
use crate::errors::{AssemblyError, RepositoryError};
use crate::ledger::LedgerSnapshot;

/// Storage for work units, validations and blocks.
///
/// `append_block` must be atomic with respect to `snapshot`: a snapshot
/// either contains the whole block or none of it.
pub trait LedgerRepository: Send + Sync {
    /// Insert or replace a work unit.
    fn save_work_unit(&self, unit: WorkUnit) -> Result<(), RepositoryError>;

    fn load_work_unit(&self, id: WorkId) -> Result<Option<WorkUnit>, RepositoryError>;

    fn load_work_units(&self) -> Result<Vec<WorkUnit>, RepositoryError>;

    fn save_validation(&self, validation: Validation) -> Result<(), RepositoryError>;

    fn load_validations(&self) -> Result<Vec<Validation>, RepositoryError>;

    /// Append a block after checking index and previous-hash linkage.
    fn append_block(&self, block: Block) -> Result<(), RepositoryError>;

    fn load_blocks(&self) -> Result<Vec<Block>, RepositoryError>;

    /// Latest block, if any.
    fn tip(&self) -> Result<Option<Block>, RepositoryError>;

    /// Consistent view of all three collections.
    fn snapshot(&self) -> Result<LedgerSnapshot, RepositoryError>;
}

/// Seals a batch of FINALIZED work units into a new linked block.
pub trait BlockAssembler: Send + Sync {
    fn assemble(&self, units: Vec<WorkUnit>, miner_id: &str) -> Result<Block, AssemblyError>;
}

/// Destination for health and compliance notifications.
#[async_trait]
pub trait AuditEventSink: Send + Sync {
    async fn emit(&self, event: AuditEvent) -> Result<(), String>;
}
