//! # Audit Vocabulary
//!
//! Health and compliance levels plus the events pushed to an
//! [`crate::AuditEventSink`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger health derived from the integrity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemHealth {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl SystemHealth {
    /// `>=99 EXCELLENT`, `>=95 GOOD`, `>=85 WARNING`, else `CRITICAL`.
    pub fn from_score(score: f64) -> Self {
        if score >= 99.0 {
            SystemHealth::Excellent
        } else if score >= 95.0 {
            SystemHealth::Good
        } else if score >= 85.0 {
            SystemHealth::Warning
        } else {
            SystemHealth::Critical
        }
    }
}

impl fmt::Display for SystemHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SystemHealth::Excellent => "EXCELLENT",
            SystemHealth::Good => "GOOD",
            SystemHealth::Warning => "WARNING",
            SystemHealth::Critical => "CRITICAL",
        })
    }
}

/// Compliance grade derived from the compliance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    FullCompliance,
    MinorIssues,
    MajorIssues,
    NonCompliant,
}

impl ComplianceLevel {
    /// `>=98 FULL`, `>=90 MINOR`, `>=75 MAJOR`, else `NON_COMPLIANT`.
    pub fn from_score(score: f64) -> Self {
        if score >= 98.0 {
            ComplianceLevel::FullCompliance
        } else if score >= 90.0 {
            ComplianceLevel::MinorIssues
        } else if score >= 75.0 {
            ComplianceLevel::MajorIssues
        } else {
            ComplianceLevel::NonCompliant
        }
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComplianceLevel::FullCompliance => "FULL_COMPLIANCE",
            ComplianceLevel::MinorIssues => "MINOR_ISSUES",
            ComplianceLevel::MajorIssues => "MAJOR_ISSUES",
            ComplianceLevel::NonCompliant => "NON_COMPLIANT",
        })
    }
}

/// Notification emitted by the auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditEvent {
    /// Health crossed into CRITICAL.
    IntegrityAlert {
        integrity_score: f64,
        health: SystemHealth,
        invalid_records: u64,
        recommendations: Vec<String>,
    },
    /// Compliance dropped to NON_COMPLIANT.
    ComplianceAlert {
        compliance_score: f64,
        level: ComplianceLevel,
        violations: u64,
        actions: Vec<String>,
    },
}
