//! # Integrity Auditing of a Live Ledger
//!
//! Tampering is simulated by rewriting records in the repository, or by
//! restoring a forged snapshot, then sweeping with the node's auditor.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dl_05_integrity::IntegrityViolation;
    use node_runtime::NodeContainer;
    use shared_types::{
        AuditEvent, ComplianceLevel, InMemoryLedger, LedgerRepository, SystemHealth, WorkType,
    };

    use crate::integration::fixtures::{config, mine, node, vote_all};

    /// One sealed block holding one unit with three validations.
    async fn sealed_ledger(node: &NodeContainer) -> shared_types::WorkUnit {
        let unit = mine(node, WorkType::PrimePattern, 3).await;
        vote_all(node, unit.id, true).await;
        node.pipeline.assemble_block("miner-1").await.unwrap().unwrap();
        node.repository.load_work_unit(unit.id).unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_rewritten_value_fails_deep_verification() {
        let mut config = config();
        config.integrity.deep_verification = true;
        let node = NodeContainer::new(config).unwrap();
        let mut alerts = node.audit_sink.subscribe();

        let mut unit = sealed_ledger(&node).await;
        unit.scientific_value += 500.0;
        node.repository.save_work_unit(unit.clone()).unwrap();

        let report = node.auditor.run_integrity_sweep().await.unwrap();
        assert_eq!(report.work_units.invalid, 1);
        assert_eq!(report.blocks.invalid, 0);
        assert_eq!(report.violations, vec![IntegrityViolation::SignatureMismatch(unit.id)]);
        // 4 of 5 records valid
        assert!((report.integrity_score - 80.0).abs() < 1e-9);
        assert_eq!(report.system_health, SystemHealth::Critical);

        match alerts.try_recv().unwrap() {
            AuditEvent::IntegrityAlert { health, invalid_records, recommendations, .. } => {
                assert_eq!(health, SystemHealth::Critical);
                assert_eq!(invalid_records, 1);
                assert!(!recommendations.is_empty());
            }
            other => panic!("unexpected alert {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rewritten_value_passes_shallow_sweep() {
        let node = node();
        let mut unit = sealed_ledger(&node).await;
        unit.scientific_value += 500.0;
        node.repository.save_work_unit(unit).unwrap();

        let report = node.auditor.run_integrity_sweep().await.unwrap();
        assert_eq!(report.integrity_score, 100.0);
    }

    #[tokio::test]
    async fn test_forged_block_is_reported() {
        let first = node();
        sealed_ledger(&first).await;

        let mut snapshot = first.repository.snapshot().unwrap();
        snapshot.blocks[0].total_scientific_value = 0.0;
        let forged: Arc<dyn LedgerRepository> = Arc::new(InMemoryLedger::restore(snapshot));
        let node = NodeContainer::with_repository(config(), forged).unwrap();
        let mut alerts = node.audit_sink.subscribe();

        let report = node.auditor.run_integrity_sweep().await.unwrap();
        assert_eq!(report.blocks.invalid, 1);
        assert!(report
            .violations
            .contains(&IntegrityViolation::HashMismatch { index: 0 }));
        assert!(report
            .violations
            .contains(&IntegrityViolation::NonPositiveBlockValue { index: 0, value: 0.0 }));
        assert!(report.recommendations[0].contains("block 0"));

        let enforcement = node.auditor.enforce_integrity_rules().unwrap();
        assert_eq!(enforcement.non_positive_blocks, 1);
        assert_eq!(enforcement.violations_detected, 1);

        // 80 integrity, minus two per enforced violation
        let compliance = node.auditor.compliance_report().await.unwrap();
        assert!((compliance.compliance_score - 78.0).abs() < 1e-9);
        assert_eq!(compliance.level, ComplianceLevel::MajorIssues);

        // Only the CRITICAL sweep alerted; MAJOR_ISSUES compliance does not
        assert!(matches!(alerts.try_recv().unwrap(), AuditEvent::IntegrityAlert { .. }));
        assert!(alerts.try_recv().is_err());
    }
}
