//! # Ledger Lifecycle Flows
//!
//! ```text
//! mine (PENDING) ──votes──→ APPROVED ──seal──→ FINALIZED ──assemble──→ Block
//!                 └─votes──→ REJECTED (terminal, never sealed)
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dl_04_consensus::{ConsensusApi, ConsensusEvent};
    use node_runtime::NodeContainer;
    use shared_types::{
        leading_zero_bits, ComplianceLevel, InMemoryLedger, LedgerRepository, SystemHealth,
        WorkStatus, WorkType, ZERO_HASH,
    };

    use crate::integration::fixtures::{config, mine, node, vote_all};

    #[tokio::test]
    async fn test_discovery_lifecycle() {
        let mut config = config();
        config.integrity.deep_verification = true;
        let node = NodeContainer::new(config).unwrap();

        let zero = mine(&node, WorkType::RiemannZero, 5).await;
        let pattern = mine(&node, WorkType::PrimePattern, 5).await;
        let gauge = mine(&node, WorkType::YangMills, 5).await;

        let approved = vote_all(&node, zero.id, true).await;
        assert_eq!(approved.status, WorkStatus::Approved);
        assert!(approved.decided);
        vote_all(&node, pattern.id, true).await;
        let rejected = vote_all(&node, gauge.id, false).await;
        assert_eq!(rejected.status, WorkStatus::Rejected);

        let status = node.consensus.get_consensus_status(zero.id).await.unwrap();
        assert_eq!(status.approval_rate, 1.0);
        assert_eq!(status.consensus_strength, 1.0);
        assert_eq!(status.voters, 3);
        assert!(status.validator_diversity > 0.99);

        let block = node.pipeline.assemble_block("miner-1").await.unwrap().unwrap();
        assert_eq!(block.index, 0);
        assert_eq!(block.previous_hash, ZERO_HASH);
        assert_eq!(block.work_ids, vec![zero.id, pattern.id]);
        assert_eq!(block.knowledge_created, 2);
        assert_eq!(block.energy_consumed, zero.energy_consumed + pattern.energy_consumed);
        assert!(leading_zero_bits(&block.block_hash) >= block.difficulty);

        // Rejected work stays out of every block
        let stored = node.repository.load_work_unit(gauge.id).unwrap().unwrap();
        assert_eq!(stored.status, WorkStatus::Rejected);

        let report = node.auditor.run_integrity_sweep().await.unwrap();
        assert_eq!(report.integrity_score, 100.0);
        assert_eq!(report.system_health, SystemHealth::Excellent);
        assert!(report.violations.is_empty());

        let compliance = node.auditor.compliance_report().await.unwrap();
        assert_eq!(compliance.compliance_score, 100.0);
        assert_eq!(compliance.level, ComplianceLevel::FullCompliance);

        let stats = node.pipeline.stats().unwrap();
        assert_eq!(stats.block_count, 1);
        assert_eq!(stats.work_unit_count, 3);
        assert_eq!(stats.validation_count, 9);
        assert_eq!(stats.finalized, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.knowledge_created, 2);
    }

    #[tokio::test]
    async fn test_consensus_events_follow_lifecycle() {
        let node = node();
        let mut events = node.consensus_events.subscribe();

        let unit = mine(&node, WorkType::PrimePattern, 3).await;
        vote_all(&node, unit.id, true).await;
        node.pipeline.assemble_block("miner-1").await.unwrap().unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            ConsensusEvent::WorkRegistered { work_id, work_type: WorkType::PrimePattern, .. }
                if work_id == unit.id
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            ConsensusEvent::WorkDecided { status: WorkStatus::Approved, voters: 3, .. }
        ));
        assert_eq!(
            events.try_recv().unwrap(),
            ConsensusEvent::WorkFinalized { work_id: unit.id }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_restart_from_snapshot_extends_chain() {
        let first = node();
        let unit = mine(&first, WorkType::YangMills, 4).await;
        vote_all(&first, unit.id, true).await;
        let genesis = first.pipeline.assemble_block("miner-1").await.unwrap().unwrap();

        let snapshot = first.repository.snapshot().unwrap();
        drop(first);

        let restored: Arc<dyn LedgerRepository> = Arc::new(InMemoryLedger::restore(snapshot));
        let second = NodeContainer::with_repository(config(), restored).unwrap();

        // A sealed unit is decided; late votes are refused
        let late = second
            .consensus
            .submit_vote(unit.id, "cern:dave", 100, true)
            .await;
        assert!(late.is_err());

        let next_unit = mine(&second, WorkType::RiemannZero, 4).await;
        assert!(next_unit.id > unit.id);
        vote_all(&second, next_unit.id, true).await;

        let next = second.pipeline.assemble_block("miner-2").await.unwrap().unwrap();
        assert_eq!(next.index, 1);
        assert_eq!(next.previous_hash, genesis.block_hash);
        assert_eq!(next.work_ids, vec![next_unit.id]);

        let report = second.auditor.run_integrity_sweep().await.unwrap();
        assert_eq!(report.blocks.valid, 2);
        assert_eq!(report.integrity_score, 100.0);
    }
}
