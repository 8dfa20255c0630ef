//! # dl-05-integrity
//!
//! Integrity and compliance auditor for the discovery ledger.
//!
//! ## Scoring
//!
//! ```text
//! integrity_score  = valid_records / total_records * 100   (100 when empty)
//! compliance_score = max(0, integrity_score - 2 * violations)
//! ```
//!
//! | Health    | Score | Compliance      | Score |
//! |-----------|-------|-----------------|-------|
//! | EXCELLENT | >= 99 | FULL_COMPLIANCE | >= 98 |
//! | GOOD      | >= 95 | MINOR_ISSUES    | >= 90 |
//! | WARNING   | >= 85 | MAJOR_ISSUES    | >= 75 |
//! | CRITICAL  | else  | NON_COMPLIANT   | else  |
//!
//! Violations are reported, never raised. CRITICAL health and NON_COMPLIANT
//! compliance are pushed to the [`shared_types::AuditEventSink`].

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::InMemoryAuditSink;
pub use domain::{
    enforce, evaluate, ComplianceReport, EnforcementReport, EntityCounts, Evaluation,
    IntegrityConfig, IntegrityError, IntegrityReport, IntegrityResult, IntegrityViolation,
    ViolationCategory,
};
pub use ports::DeepVerifier;
pub use service::IntegrityAuditor;
