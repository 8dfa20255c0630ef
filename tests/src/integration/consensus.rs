//! # Validator Consensus Through a Wired Node
//!
//! Bounded validator sets come from configuration (`category:name` ids with
//! stake); an empty set leaves membership open.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dl_04_consensus::{ConsensusApi, ConsensusError};
    use node_runtime::container::ValidatorSpec;
    use node_runtime::NodeContainer;
    use shared_types::{LedgerRepository, WorkStatus, WorkType};

    use crate::integration::fixtures::{config, mine, node, vote_all, VALIDATORS};

    fn bounded_node() -> NodeContainer {
        let mut config = config();
        config.consensus.validators = VALIDATORS
            .iter()
            .map(|id| ValidatorSpec {
                id: id.to_string(),
                stake: 100,
            })
            .collect();
        NodeContainer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_bounded_set_rejects_once_approval_is_unreachable() {
        let node = bounded_node();
        let unit = mine(&node, WorkType::PrimePattern, 4).await;

        // 100 of 300 stake against: at best 200/300, below the 0.75 threshold
        let outcome = node
            .consensus
            .submit_vote(unit.id, VALIDATORS[0], 100, false)
            .await
            .unwrap();
        assert_eq!(outcome.status, WorkStatus::Rejected);
        assert!(outcome.decided);

        let late = node
            .consensus
            .submit_vote(unit.id, VALIDATORS[1], 100, true)
            .await
            .unwrap_err();
        assert!(matches!(late, ConsensusError::StaleWork { status: WorkStatus::Rejected, .. }));

        let seal = node.consensus.seal(unit.id).await.unwrap_err();
        assert!(matches!(seal, ConsensusError::StaleWork { .. }));
        assert_eq!(node.pipeline.assemble_block("miner-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bounded_set_refuses_outsiders() {
        let node = bounded_node();
        let unit = mine(&node, WorkType::RiemannZero, 4).await;

        let err = node
            .consensus
            .submit_vote(unit.id, "rogue:mallory", 1_000, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::UnknownValidator(_)));

        let err = node
            .consensus
            .submit_vote(unit.id, VALIDATORS[0], 1_000, false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsensusError::StakeExceedsRegistration { registered: 100, .. }
        ));
        assert!(node.repository.load_validations().unwrap().is_empty());

        let outcome = vote_all(&node, unit.id, true).await;
        assert_eq!(outcome.status, WorkStatus::Approved);
    }

    #[tokio::test]
    async fn test_pending_units_cannot_be_sealed() {
        let node = node();
        let unit = mine(&node, WorkType::YangMills, 2).await;
        node.consensus
            .submit_vote(unit.id, VALIDATORS[0], 100, true)
            .await
            .unwrap();

        let status = node.consensus.get_consensus_status(unit.id).await.unwrap();
        assert_eq!(status.status, WorkStatus::UnderReview);
        assert!(matches!(
            node.consensus.seal(unit.id).await.unwrap_err(),
            ConsensusError::QuorumNotReached { status: WorkStatus::UnderReview, .. }
        ));

        let duplicate = node
            .consensus
            .submit_vote(unit.id, VALIDATORS[0], 100, true)
            .await
            .unwrap_err();
        assert!(matches!(duplicate, ConsensusError::DuplicateVote { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_decide_exactly_once() {
        let node = Arc::new(node());
        let unit = mine(&node, WorkType::PrimePattern, 3).await;
        let work_id = unit.id;

        let votes = (0..32).map(|i| {
            let node = Arc::clone(&node);
            tokio::spawn(async move {
                node.consensus
                    .submit_vote(work_id, &format!("lab{}:validator-{i}", i % 4), 10, true)
                    .await
            })
        });
        let results = futures::future::join_all(votes).await;

        let mut decided = 0;
        let mut accepted = 0;
        for result in results {
            match result.unwrap() {
                Ok(outcome) => {
                    accepted += 1;
                    if outcome.decided {
                        decided += 1;
                    }
                }
                Err(e) => assert!(matches!(e, ConsensusError::StaleWork { .. }), "{e}"),
            }
        }
        assert_eq!(decided, 1);
        // Quorum is three voters; every later vote saw a decided unit
        assert_eq!(accepted, 3);
        assert_eq!(node.repository.load_validations().unwrap().len(), 3);

        let stored = node.repository.load_work_unit(unit.id).unwrap().unwrap();
        assert_eq!(stored.status, WorkStatus::Approved);
    }
}
