//! Driven ports (Outbound dependencies)

use crate::domain::EligibleSet;
use crate::events::ConsensusEvent;
use async_trait::async_trait;
use shared_types::WorkUnit;

/// Signature re-verification for registered units
///
/// # Security
/// Consensus never trusts a signature field it did not check itself.
pub trait WorkVerifier: Send + Sync {
    /// `Ok(true)` when the unit's signature matches its contents.
    fn verify(&self, unit: &WorkUnit) -> Result<bool, String>;
}

/// Validator membership and institutional categories
pub trait ValidatorDirectory: Send + Sync {
    /// Whether `validator_id` may vote at all.
    fn is_eligible(&self, validator_id: &str) -> bool;

    /// Category used for the diversity measure.
    fn category_of(&self, validator_id: &str) -> String;

    /// The full voting population, when it is bounded.
    ///
    /// `None` means anyone may still vote, so approval is never ruled
    /// unreachable.
    fn eligible_set(&self) -> Option<EligibleSet>;

    /// Stake a validator is registered with, when the directory knows it.
    ///
    /// Votes may claim at most this much.
    fn registered_stake(&self, validator_id: &str) -> Option<u64>;
}

/// Event publisher for choreography
#[async_trait]
pub trait ConsensusEventPublisher: Send + Sync {
    async fn publish(&self, event: ConsensusEvent) -> Result<(), String>;
}
