//! Published events (Outgoing)

use serde::{Deserialize, Serialize};
use shared_types::{WorkId, WorkStatus, WorkType};

/// Published after a consensus state change
///
/// Block assembly subscribes to `WorkFinalized`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConsensusEvent {
    /// A unit entered consensus as PENDING.
    WorkRegistered {
        work_id: WorkId,
        work_type: WorkType,
        scientific_value: f64,
    },
    /// A vote decided the unit (APPROVED or REJECTED).
    WorkDecided {
        work_id: WorkId,
        status: WorkStatus,
        approval_rate: f64,
        voters: usize,
    },
    /// An APPROVED unit was sealed.
    WorkFinalized { work_id: WorkId },
}

impl ConsensusEvent {
    pub fn work_id(&self) -> WorkId {
        match self {
            ConsensusEvent::WorkRegistered { work_id, .. }
            | ConsensusEvent::WorkDecided { work_id, .. }
            | ConsensusEvent::WorkFinalized { work_id } => *work_id,
        }
    }
}
