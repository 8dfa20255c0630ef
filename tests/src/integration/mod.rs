//! # Cross-Crate Flows
//!
//! Every test drives a node built by `NodeContainer`, so the real adapters
//! sit between computation, signing, consensus, auditing and assembly.
//!
//! - `flows`: mine → vote → seal → assemble → sweep, restart from a snapshot
//! - `consensus`: bounded validator sets, late votes, concurrent voting
//! - `audit`: tampering detection and alert delivery

pub mod audit;
pub mod consensus;
pub mod flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use dl_04_consensus::{ConsensusApi, VoteOutcome};
    use node_runtime::{NodeConfig, NodeContainer};
    use shared_types::{WorkId, WorkParams, WorkType, WorkUnit};

    pub const WORKER: &str = "worker-1";
    pub const VALIDATORS: [&str; 3] = ["cern:alice", "mit:bob", "eth:carol"];

    /// Seeded node with a cheap nonce search.
    pub fn config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.computation.worker_threads = 2;
        config.computation.max_in_flight = 8;
        config.computation.entropy_seed = Some(42);
        config.assembly.difficulty_bits = 4;
        config.assembly.max_nonce_attempts = 1 << 16;
        config
    }

    pub fn node() -> NodeContainer {
        NodeContainer::new(config()).unwrap()
    }

    pub async fn mine(node: &NodeContainer, work_type: WorkType, difficulty: u32) -> WorkUnit {
        node.pipeline
            .mine(work_type, WorkParams::derived(work_type), difficulty, WORKER)
            .await
            .unwrap()
    }

    /// Every validator votes `approve` with equal stake; returns the last outcome.
    pub async fn vote_all(node: &NodeContainer, work_id: WorkId, approve: bool) -> VoteOutcome {
        let mut last = None;
        for validator in VALIDATORS {
            last = Some(
                node.consensus
                    .submit_vote(work_id, validator, 100, approve)
                    .await
                    .unwrap(),
            );
        }
        last.unwrap()
    }
}
