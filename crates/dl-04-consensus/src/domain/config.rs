/// Consensus parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusConfig {
    /// Approving stake share needed for APPROVED.
    pub consensus_threshold: f64,
    /// Distinct voters needed before any decision.
    pub min_validators: usize,
    /// Rejecting stake share that rejects outright.
    pub rejection_quorum: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: 0.75,
            min_validators: 3,
            rejection_quorum: 0.75,
        }
    }
}
