//! Integrity auditor service
//!
//! Every operation reads one repository snapshot, so a sweep never sees a
//! partially appended block. Rule evaluation runs on the blocking pool and
//! never holds a ledger lock.

use crate::domain::{
    enforce, evaluate, ComplianceReport, EnforcementReport, Evaluation, IntegrityConfig,
    IntegrityError, IntegrityReport, IntegrityResult,
};
use crate::metrics;
use crate::ports::DeepVerifier;
use parking_lot::RwLock;
use shared_types::{
    AuditEvent, AuditEventSink, ComplianceLevel, LedgerRepository, LedgerSnapshot, SystemHealth,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct IntegrityAuditor<R, S>
where
    R: LedgerRepository + ?Sized,
    S: AuditEventSink + ?Sized,
{
    repository: Arc<R>,
    sink: Arc<S>,
    deep: Option<Arc<dyn DeepVerifier>>,
    config: IntegrityConfig,
    last_report: RwLock<Option<IntegrityReport>>,
}

impl<R, S> IntegrityAuditor<R, S>
where
    R: LedgerRepository + ?Sized,
    S: AuditEventSink + ?Sized,
{
    pub fn new(repository: Arc<R>, sink: Arc<S>, config: IntegrityConfig) -> Self {
        Self {
            repository,
            sink,
            deep: None,
            config,
            last_report: RwLock::new(None),
        }
    }

    /// Attach signature and result re-derivation for deep sweeps.
    pub fn with_deep_verifier(mut self, verifier: Arc<dyn DeepVerifier>) -> Self {
        self.deep = Some(verifier);
        self
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Report of the most recent completed sweep.
    pub fn last_report(&self) -> Option<IntegrityReport> {
        self.last_report.read().clone()
    }

    async fn evaluate_snapshot(&self, snapshot: Arc<LedgerSnapshot>) -> IntegrityResult<Evaluation> {
        let config = self.config.clone();
        let deep = self.deep.clone();
        tokio::task::spawn_blocking(move || evaluate(&snapshot, &config, deep.as_deref()))
            .await
            .map_err(|e| IntegrityError::Aborted(e.to_string()))
    }

    async fn alert(&self, kind: &str, event: AuditEvent) {
        metrics::record_alert(kind);
        if let Err(e) = self.sink.emit(event).await {
            error!(kind, error = %e, "Failed to emit audit alert");
        }
    }

    /// Classify every block, work unit and validation.
    ///
    /// Emits an `IntegrityAlert` when health is CRITICAL.
    pub async fn run_integrity_sweep(&self) -> IntegrityResult<IntegrityReport> {
        let snapshot = Arc::new(self.repository.snapshot()?);
        let report = IntegrityReport::from_evaluation(self.evaluate_snapshot(snapshot).await?);

        metrics::record_sweep(report.integrity_score);
        info!(
            integrity_score = report.integrity_score,
            health = %report.system_health,
            invalid_blocks = report.blocks.invalid,
            invalid_work_units = report.work_units.invalid,
            invalid_validations = report.validations.invalid,
            "Integrity sweep completed"
        );

        if report.system_health == SystemHealth::Critical {
            warn!(integrity_score = report.integrity_score, "Ledger integrity is CRITICAL");
            self.alert(
                "integrity",
                AuditEvent::IntegrityAlert {
                    integrity_score: report.integrity_score,
                    health: report.system_health,
                    invalid_records: report.invalid_records(),
                    recommendations: report.recommendations.clone(),
                },
            )
            .await;
        }

        *self.last_report.write() = Some(report.clone());
        Ok(report)
    }

    /// Count non-positive-value blocks, incomplete work records and
    /// under-validated discoveries.
    pub fn enforce_integrity_rules(&self) -> IntegrityResult<EnforcementReport> {
        let snapshot = self.repository.snapshot()?;
        let report = enforce(&snapshot, &self.config);
        if report.violations_detected > 0 {
            warn!(
                violations = report.violations_detected,
                non_positive_blocks = report.non_positive_blocks,
                incomplete_work = report.incomplete_work,
                under_validated = report.under_validated,
                "Integrity rules violated"
            );
        }
        Ok(report)
    }

    /// Integrity score minus two points per enforced violation.
    ///
    /// Emits a `ComplianceAlert` when NON_COMPLIANT.
    pub async fn compliance_report(&self) -> IntegrityResult<ComplianceReport> {
        let snapshot = Arc::new(self.repository.snapshot()?);
        let enforcement = enforce(&snapshot, &self.config);
        let evaluation = self.evaluate_snapshot(snapshot).await?;
        let report = ComplianceReport::new(evaluation.score(), enforcement);

        metrics::record_compliance(report.compliance_score);
        info!(
            compliance_score = report.compliance_score,
            level = %report.level,
            violations = report.violations,
            "Compliance report generated"
        );

        if report.level == ComplianceLevel::NonCompliant {
            warn!(compliance_score = report.compliance_score, "Ledger is NON_COMPLIANT");
            self.alert(
                "compliance",
                AuditEvent::ComplianceAlert {
                    compliance_score: report.compliance_score,
                    level: report.level,
                    violations: report.violations,
                    actions: report.actions.clone(),
                },
            )
            .await;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
