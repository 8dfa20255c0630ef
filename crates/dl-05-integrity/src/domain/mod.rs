//! Integrity domain: rules, violations and report types.

mod rules;
mod violation;

pub use rules::{enforce, evaluate, Evaluation};
pub use violation::{IntegrityViolation, ViolationCategory};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ComplianceLevel, RepositoryError, SystemHealth};

/// Auditor settings
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityConfig {
    /// Distinct validations an accepted unit must carry.
    pub min_validations: usize,
    /// Re-derive signatures and results during sweeps.
    pub deep_verification: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            min_validations: 3,
            deep_verification: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrityError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Sweep aborted: {0}")]
    Aborted(String),
}

pub type IntegrityResult<T> = Result<T, IntegrityError>;

/// Valid and invalid record counts for one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub valid: u64,
    pub invalid: u64,
}

impl EntityCounts {
    pub fn total(&self) -> u64 {
        self.valid + self.invalid
    }

    pub(crate) fn tally(&mut self, ok: bool) {
        if ok {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }
}

/// Result of `run_integrity_sweep`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub integrity_score: f64,
    pub system_health: SystemHealth,
    pub blocks: EntityCounts,
    pub work_units: EntityCounts,
    pub validations: EntityCounts,
    pub violations: Vec<IntegrityViolation>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl IntegrityReport {
    pub fn from_evaluation(evaluation: Evaluation) -> Self {
        let integrity_score = evaluation.score();
        let recommendations = recommendations(&evaluation);
        Self {
            integrity_score,
            system_health: SystemHealth::from_score(integrity_score),
            blocks: evaluation.blocks,
            work_units: evaluation.work_units,
            validations: evaluation.validations,
            violations: evaluation.violations,
            recommendations,
            generated_at: Utc::now(),
        }
    }

    pub fn invalid_records(&self) -> u64 {
        self.blocks.invalid + self.work_units.invalid + self.validations.invalid
    }
}

/// Result of `enforce_integrity_rules`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementReport {
    pub violations_detected: u64,
    pub non_positive_blocks: u64,
    pub incomplete_work: u64,
    pub under_validated: u64,
    pub actions: Vec<String>,
}

/// Result of `compliance_report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub compliance_score: f64,
    pub level: ComplianceLevel,
    pub integrity_score: f64,
    pub violations: u64,
    pub actions: Vec<String>,
}

impl ComplianceReport {
    /// `max(0, integrity - 2 * violations)`.
    pub fn new(integrity_score: f64, enforcement: EnforcementReport) -> Self {
        let compliance_score = (integrity_score - 2.0 * enforcement.violations_detected as f64).max(0.0);
        Self {
            compliance_score,
            level: ComplianceLevel::from_score(compliance_score),
            integrity_score,
            violations: enforcement.violations_detected,
            actions: enforcement.actions,
        }
    }
}

/// Operator guidance, most severe category first.
fn recommendations(evaluation: &Evaluation) -> Vec<String> {
    let present = |c: ViolationCategory| evaluation.violations.iter().any(|v| v.category() == c);
    let mut out = Vec::new();

    if present(ViolationCategory::ChainStructure) {
        match evaluation.first_invalid_block {
            Some(index) => out.push(format!(
                "Rebuild the chain from block {index}: linkage or header checks failed"
            )),
            None => out.push("Rebuild the chain: linkage or header checks failed".to_string()),
        }
    }
    if present(ViolationCategory::Reproducibility) {
        out.push("Recompute work units whose signature or result does not reproduce".to_string());
    }
    if present(ViolationCategory::BlockValue) {
        out.push("Re-valuate blocks with non-positive scientific value".to_string());
    }
    if present(ViolationCategory::IncompleteWork) {
        out.push("Quarantine incomplete work records until they are re-signed".to_string());
    }
    if present(ViolationCategory::UnderValidated) {
        out.push("Solicit additional validator votes for under-validated discoveries".to_string());
    }
    if present(ViolationCategory::ValidationRecord) {
        out.push("Purge orphaned or duplicate validation records".to_string());
    }

    if out.is_empty() {
        out.push("No action required".to_string());
    } else if SystemHealth::from_score(evaluation.score()) == SystemHealth::Critical {
        out.push("Suspend block assembly until a clean sweep completes".to_string());
    }
    out
}
