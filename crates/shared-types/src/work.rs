//! # Work Payloads
//!
//! Strongly typed parameters, results and verification facts for each
//! computable work family. Every payload is a tagged union keyed by
//! [`WorkType`] so producers and consumers share one exhaustive schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted difficulty.
pub const MIN_DIFFICULTY: u32 = 1;
/// Highest accepted difficulty.
pub const MAX_DIFFICULTY: u32 = 1000;

/// Computable work families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Locate a non-trivial zero of the Riemann zeta function.
    RiemannZero,
    /// Scan an integer range for prime pairs at a fixed gap.
    PrimePattern,
    /// Check gauge-field identities against supplied scalars.
    YangMills,
}

impl WorkType {
    /// All work types, in declaration order.
    pub const ALL: [WorkType; 3] = [WorkType::RiemannZero, WorkType::PrimePattern, WorkType::YangMills];

    /// Wire name (`riemann_zero`, `prime_pattern`, `yang_mills`).
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::RiemannZero => "riemann_zero",
            WorkType::PrimePattern => "prime_pattern",
            WorkType::YangMills => "yang_mills",
        }
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            WorkType::RiemannZero => "Computing non-trivial zeros of the Riemann zeta function",
            WorkType::PrimePattern => "Discovering prime constellations at a fixed gap",
            WorkType::YangMills => "Validating Yang-Mills gauge field identities",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Caller-declared parameters. `None` fields are derived from difficulty or
/// from the injected seed; the stored unit always carries resolved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkParams {
    ZeroFinding {
        zero_index: Option<u64>,
    },
    PatternDiscovery {
        range_start: Option<u64>,
        range_end: Option<u64>,
        gap: u64,
    },
    InvariantValidation {
        field_strength: Option<f64>,
        coupling: Option<f64>,
        energy_density: Option<f64>,
        action: Option<f64>,
        mass_gap: Option<f64>,
    },
}

impl WorkParams {
    /// The work family these parameters belong to.
    pub fn work_type(&self) -> WorkType {
        match self {
            WorkParams::ZeroFinding { .. } => WorkType::RiemannZero,
            WorkParams::PatternDiscovery { .. } => WorkType::PrimePattern,
            WorkParams::InvariantValidation { .. } => WorkType::YangMills,
        }
    }

    /// Parameters with every optional field left for derivation.
    pub fn derived(work_type: WorkType) -> Self {
        match work_type {
            WorkType::RiemannZero => WorkParams::ZeroFinding { zero_index: None },
            WorkType::PrimePattern => WorkParams::PatternDiscovery {
                range_start: None,
                range_end: None,
                gap: 2,
            },
            WorkType::YangMills => WorkParams::InvariantValidation {
                field_strength: None,
                coupling: None,
                energy_density: None,
                action: None,
                mass_gap: None,
            },
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Located zeta zero on the critical line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroResult {
    pub zero_index: u64,
    pub real: f64,
    pub imaginary: f64,
    /// True when the value came from the reference catalogue.
    pub catalogued: bool,
    /// Decimal exponent of the error bound; `None` for catalogued values.
    pub error_exponent: Option<i32>,
    pub precision_digits: u32,
    pub iterations: u64,
}

impl ZeroResult {
    /// Absolute error bound, `0.0` when exact.
    pub fn error_bound(&self) -> f64 {
        self.error_exponent.map_or(0.0, |e| 10f64.powi(e))
    }
}

/// Prime pairs found in a scanned range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern_type: String,
    pub range_start: u64,
    pub range_end: u64,
    pub gap: u64,
    pub patterns_found: u64,
    pub avg_resonance: f64,
    pub largest_gap: u64,
    pub primes_found: u64,
    pub sample_pairs: Vec<(u64, u64)>,
}

/// One identity check inside an invariant validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCheck {
    pub name: String,
    pub expected: f64,
    pub observed: f64,
    pub deviation: f64,
}

/// Outcome of validating gauge-field identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantResult {
    pub field_samples: u64,
    pub symmetry_group: String,
    pub checks: Vec<ConstraintCheck>,
    pub score: f64,
    pub all_satisfied: bool,
}

/// Work-type specific computation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkResult {
    ZeroFinding(ZeroResult),
    PatternDiscovery(PatternResult),
    InvariantValidation(InvariantResult),
}

impl WorkResult {
    pub fn work_type(&self) -> WorkType {
        match self {
            WorkResult::ZeroFinding(_) => WorkType::RiemannZero,
            WorkResult::PatternDiscovery(_) => WorkType::PrimePattern,
            WorkResult::InvariantValidation(_) => WorkType::YangMills,
        }
    }

    /// Number of discrete findings, used by the cost model.
    pub fn result_size(&self) -> u64 {
        match self {
            WorkResult::ZeroFinding(_) => 1,
            WorkResult::PatternDiscovery(p) => p.patterns_found,
            WorkResult::InvariantValidation(v) => v.checks.len() as u64,
        }
    }

    /// False if any floating point field is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            WorkResult::ZeroFinding(z) => z.real.is_finite() && z.imaginary.is_finite(),
            WorkResult::PatternDiscovery(p) => p.avg_resonance.is_finite(),
            WorkResult::InvariantValidation(v) => {
                v.score.is_finite()
                    && v.checks.iter().all(|c| {
                        c.expected.is_finite() && c.observed.is_finite() && c.deviation.is_finite()
                    })
            }
        }
    }
}

// =============================================================================
// VERIFICATION DATA
// =============================================================================

/// Auxiliary facts that let an independent party re-derive a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationData {
    ZeroFinding {
        method: String,
        /// Hex SHA-256 over the zero index and value bits.
        verification_hash: String,
    },
    PatternDiscovery {
        method: String,
        /// Hex SHA-256 over every prime found in range.
        primes_digest: String,
        pattern_density: f64,
    },
    InvariantValidation {
        method: String,
        /// Hex SHA-256 over the deviation bits.
        deviations_digest: String,
        mass_gap_confirmed: bool,
    },
}

impl VerificationData {
    pub fn method(&self) -> &str {
        match self {
            VerificationData::ZeroFinding { method, .. }
            | VerificationData::PatternDiscovery { method, .. }
            | VerificationData::InvariantValidation { method, .. } => method,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            VerificationData::PatternDiscovery { pattern_density, .. } => pattern_density.is_finite(),
            _ => true,
        }
    }
}
