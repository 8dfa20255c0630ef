//! Driving ports (Inbound API)

use crate::domain::{ConsensusResult, ConsensusStatus, VoteOutcome};
use async_trait::async_trait;
use shared_types::{WorkId, WorkUnit};

/// Primary consensus API
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Admit a signed PENDING unit.
    ///
    /// # Security
    /// Zero-trust: the signature is re-derived here regardless of who
    /// produced the unit.
    async fn register_work(&self, unit: WorkUnit) -> ConsensusResult<WorkId>;

    /// Cast one stake-weighted vote.
    ///
    /// Votes on a single unit are serialized; the vote that crosses a
    /// threshold performs the only deciding transition.
    async fn submit_vote(
        &self,
        work_id: WorkId,
        validator_id: &str,
        stake: u64,
        approve: bool,
    ) -> ConsensusResult<VoteOutcome>;

    /// Current status, approval rate, strength and diversity.
    async fn get_consensus_status(&self, work_id: WorkId) -> ConsensusResult<ConsensusStatus>;

    /// Move an APPROVED unit to FINALIZED.
    async fn seal(&self, work_id: WorkId) -> ConsensusResult<WorkUnit>;
}
