use super::*;
use crate::adapters::InMemoryAuditSink;
use crate::domain::IntegrityViolation;
use chrono::{TimeZone, Utc};
use shared_types::hashing::header_hash_with_nonce;
use shared_types::{
    leading_zero_bits, merkle_root, work_leaf_hash, Block, InMemoryLedger, InvariantResult,
    Validation, VerificationData, WorkId, WorkParams, WorkResult, WorkStatus, WorkType, WorkUnit,
    ZERO_HASH,
};

fn unit(id: u64) -> WorkUnit {
    WorkUnit {
        id: WorkId(id),
        work_type: WorkType::YangMills,
        difficulty: 4,
        params: WorkParams::InvariantValidation {
            field_strength: Some(20.0),
            coupling: Some(1.0),
            energy_density: Some(200.0),
            action: Some(100.0),
            mass_gap: Some(1.0),
        },
        seed: Some(id),
        result: WorkResult::InvariantValidation(InvariantResult {
            field_samples: 400,
            symmetry_group: "SU(3)".into(),
            checks: vec![],
            score: 1.0,
            all_satisfied: true,
        }),
        verification: VerificationData::InvariantValidation {
            method: "gauge_constraint_check".into(),
            deviations_digest: "ef".repeat(32),
            mass_gap_confirmed: true,
        },
        computational_cost: 5.0,
        energy_efficiency: 300.0,
        energy_consumed: 0.0032,
        precision: 15.0,
        scientific_value: 1500.0,
        worker_id: "worker-1".into(),
        signature: Some(format!("{:064x}", id + 1)),
        timestamp: Utc.timestamp_millis_opt(1_700_000_000_000 + id as i64).unwrap(),
        status: WorkStatus::Finalized,
    }
}

fn votes(id: u64, n: usize) -> Vec<Validation> {
    (0..n)
        .map(|i| Validation {
            work_id: WorkId(id),
            validator_id: format!("validator-{i}"),
            stake: 100,
            approve: true,
            submitted_at: Utc.timestamp_millis_opt(1_700_000_100_000).unwrap(),
        })
        .collect()
}

fn mine(mut block: Block) -> Block {
    let nonce = (0..)
        .find(|n| leading_zero_bits(&header_hash_with_nonce(&block, *n)) >= block.difficulty)
        .unwrap();
    block.nonce = nonce;
    block.block_hash = block.compute_hash();
    block
}

/// A consistent ledger of `n` blocks, each sealing one finalized unit with
/// three validations.
fn ledger(n: u64) -> LedgerSnapshot {
    let mut snapshot = LedgerSnapshot::default();
    let mut previous_hash = ZERO_HASH;
    for i in 0..n {
        let u = unit(i);
        let leaf = work_leaf_hash(u.id, u.signature.as_deref().unwrap());
        let block = mine(Block {
            index: i,
            previous_hash,
            merkle_root: merkle_root(&[leaf]),
            difficulty: 1,
            nonce: 0,
            block_hash: ZERO_HASH,
            miner_id: "miner-1".into(),
            total_scientific_value: u.scientific_value,
            energy_consumed: u.energy_consumed,
            knowledge_created: 1,
            work_ids: vec![u.id],
            timestamp: Utc.timestamp_millis_opt(1_700_000_200_000 + i as i64).unwrap(),
        });
        previous_hash = block.block_hash;
        snapshot.blocks.push(block);
        snapshot.validations.extend(votes(i, 3));
        snapshot.work_units.push(u);
    }
    snapshot
}

fn auditor(snapshot: LedgerSnapshot) -> (IntegrityAuditor<InMemoryLedger, InMemoryAuditSink>, Arc<InMemoryAuditSink>) {
    let sink = Arc::new(InMemoryAuditSink::new());
    let auditor = IntegrityAuditor::new(
        Arc::new(InMemoryLedger::restore(snapshot)),
        sink.clone(),
        IntegrityConfig::default(),
    );
    (auditor, sink)
}

struct MockDeepVerifier {
    bad_result: WorkId,
}

impl DeepVerifier for MockDeepVerifier {
    fn verify_signature(&self, _unit: &WorkUnit) -> Result<bool, String> {
        Ok(true)
    }

    fn reproduce(&self, unit: &WorkUnit) -> Result<bool, String> {
        if unit.id == self.bad_result {
            Err("result differs".into())
        } else {
            Ok(true)
        }
    }
}

#[tokio::test]
async fn test_clean_ledger_is_excellent() {
    let (auditor, sink) = auditor(ledger(5));
    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.integrity_score, 100.0, "{:?}", report.violations);
    assert_eq!(report.system_health, SystemHealth::Excellent);
    assert_eq!(report.blocks.valid, 5);
    assert_eq!(report.work_units.valid, 5);
    assert_eq!(report.validations.valid, 15);
    assert_eq!(report.recommendations, vec!["No action required".to_string()]);
    assert_eq!(sink.event_count(), 0);
    assert_eq!(auditor.last_report(), Some(report));
}

#[tokio::test]
async fn test_empty_ledger_scores_full() {
    let (auditor, _) = auditor(LedgerSnapshot::default());
    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.integrity_score, 100.0);
    assert_eq!(report.system_health, SystemHealth::Excellent);
}

#[tokio::test]
async fn test_two_non_positive_blocks_of_ten() {
    let mut snapshot = ledger(10);
    snapshot.blocks[3].total_scientific_value = 0.0;
    snapshot.blocks[7].total_scientific_value = -5.0;
    let (auditor, sink) = auditor(snapshot);

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.blocks.valid, 8);
    assert_eq!(report.blocks.invalid, 2);
    assert_eq!(report.work_units.valid, 10);
    assert_eq!(report.validations.valid, 30);
    // (8 + 10 + 30) / (10 + 10 + 30)
    assert!((report.integrity_score - 96.0).abs() < 1e-9);
    assert_eq!(report.system_health, SystemHealth::Good);
    assert!(report
        .violations
        .contains(&IntegrityViolation::NonPositiveBlockValue { index: 3, value: 0.0 }));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("Re-valuate blocks")));
    assert_eq!(sink.event_count(), 0);

    let enforcement = auditor.enforce_integrity_rules().unwrap();
    assert_eq!(enforcement.non_positive_blocks, 2);
    assert_eq!(enforcement.violations_detected, 2);
    assert_eq!(enforcement.actions.len(), 2);

    let compliance = auditor.compliance_report().await.unwrap();
    assert!((compliance.compliance_score - 92.0).abs() < 1e-9);
    assert_eq!(compliance.level, ComplianceLevel::MinorIssues);
}

#[tokio::test]
async fn test_broken_linkage_detected() {
    let mut snapshot = ledger(6);
    snapshot.blocks[4].previous_hash = [7u8; 32];
    let (auditor, _) = auditor(snapshot);

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.blocks.invalid, 1);
    assert!(report
        .violations
        .contains(&IntegrityViolation::BrokenLinkage { index: 4 }));
    assert!(report.recommendations[0].contains("block 4"));
}

#[tokio::test]
async fn test_merkle_and_inclusion_checks() {
    let mut snapshot = ledger(3);
    snapshot.work_units[1].signature = Some("f".repeat(64));
    snapshot.work_units[2].status = WorkStatus::Approved;
    let (auditor, _) = auditor(snapshot);

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert!(report
        .violations
        .contains(&IntegrityViolation::MerkleMismatch { index: 1 }));
    assert!(report.violations.contains(&IntegrityViolation::UnfinalizedInclusion {
        index: 2,
        work_id: WorkId(2)
    }));
    assert_eq!(report.blocks.valid, 1);
}

#[tokio::test]
async fn test_critical_health_alerts() {
    let mut snapshot = ledger(4);
    for unit in &mut snapshot.work_units {
        unit.signature = None;
    }
    snapshot.validations.clear();
    let (auditor, sink) = auditor(snapshot);

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.system_health, SystemHealth::Critical);
    let events = sink.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        AuditEvent::IntegrityAlert {
            health,
            invalid_records,
            recommendations,
            ..
        } => {
            assert_eq!(*health, SystemHealth::Critical);
            assert_eq!(*invalid_records, report.invalid_records());
            assert!(recommendations.iter().any(|r| r.contains("Suspend block assembly")));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_non_compliance_alerts() {
    let mut snapshot = ledger(2);
    for i in 10..30 {
        let mut u = unit(i);
        u.worker_id.clear();
        u.status = WorkStatus::Pending;
        snapshot.work_units.push(u);
    }
    let (auditor, sink) = auditor(snapshot);

    let compliance = auditor.compliance_report().await.unwrap();
    assert_eq!(compliance.violations, 20);
    assert_eq!(compliance.level, ComplianceLevel::NonCompliant);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, AuditEvent::ComplianceAlert { .. })));
}

#[tokio::test]
async fn test_under_validated_discovery() {
    let mut snapshot = ledger(2);
    snapshot.validations.retain(|v| !(v.work_id == WorkId(1) && v.validator_id == "validator-0"));
    let (auditor, _) = auditor(snapshot);

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert!(report.violations.contains(&IntegrityViolation::UnderValidated {
        work_id: WorkId(1),
        validations: 2,
        required: 3
    }));

    let enforcement = auditor.enforce_integrity_rules().unwrap();
    assert_eq!(enforcement.under_validated, 1);
    assert_eq!(enforcement.actions, vec!["Request 1 more validation(s) for work-1".to_string()]);
}

#[tokio::test]
async fn test_validation_records() {
    let mut snapshot = ledger(1);
    let mut duplicate = snapshot.validations[0].clone();
    duplicate.approve = false;
    snapshot.validations.push(duplicate);
    let mut orphan = snapshot.validations[0].clone();
    orphan.work_id = WorkId(404);
    snapshot.validations.push(orphan);
    let (auditor, _) = auditor(snapshot);

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.validations.valid, 3);
    assert_eq!(report.validations.invalid, 2);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("orphaned or duplicate")));
}

#[tokio::test]
async fn test_deep_verification_flags_irreproducible_work() {
    let snapshot = ledger(3);
    let sink = Arc::new(InMemoryAuditSink::new());
    let config = IntegrityConfig {
        deep_verification: true,
        ..IntegrityConfig::default()
    };
    let auditor = IntegrityAuditor::new(Arc::new(InMemoryLedger::restore(snapshot)), sink, config)
        .with_deep_verifier(Arc::new(MockDeepVerifier {
            bad_result: WorkId(2),
        }));

    let report = auditor.run_integrity_sweep().await.unwrap();
    assert_eq!(report.work_units.invalid, 1);
    assert_eq!(report.violations, vec![IntegrityViolation::ResultMismatch(WorkId(2))]);
}
