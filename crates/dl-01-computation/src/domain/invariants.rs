//! # Gauge Invariant Validation
//!
//! Checks caller-supplied scalars against fixed identities of a classical
//! SU(3) gauge field with field strength `F` and coupling `g`:
//!
//! | Constraint       | Expected            |
//! |------------------|---------------------|
//! | `energy_density` | `F^2 / 2`           |
//! | `action`         | `F^2 / (4 g^2)`     |
//! | `mass_gap`       | `>= 0`              |
//!
//! Composite score is `1 / (1 + sum(deviations))`.

use shared_types::{ConstraintCheck, InvariantResult};

/// Per-constraint deviation below which the constraint holds.
pub const CONSTRAINT_TOLERANCE: f64 = 1e-3;

pub const SYMMETRY_GROUP: &str = "SU(3)";

/// Fully resolved validation inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeInputs {
    pub field_strength: f64,
    pub coupling: f64,
    pub energy_density: f64,
    pub action: f64,
    pub mass_gap: f64,
}

pub fn expected_energy_density(field_strength: f64) -> f64 {
    field_strength * field_strength / 2.0
}

pub fn expected_action(field_strength: f64, coupling: f64) -> f64 {
    field_strength * field_strength / (4.0 * coupling * coupling)
}

/// Evaluate every identity.
pub fn validate(inputs: &GaugeInputs, difficulty: u32) -> InvariantResult {
    let checks = vec![
        check(
            "energy_density",
            expected_energy_density(inputs.field_strength),
            inputs.energy_density,
        ),
        check(
            "action",
            expected_action(inputs.field_strength, inputs.coupling),
            inputs.action,
        ),
        ConstraintCheck {
            name: "mass_gap".to_string(),
            expected: 0.0,
            observed: inputs.mass_gap,
            deviation: (-inputs.mass_gap).max(0.0),
        },
    ];

    let total_error: f64 = checks.iter().map(|c| c.deviation).sum();
    let all_satisfied = checks.iter().all(|c| c.deviation < CONSTRAINT_TOLERANCE);

    InvariantResult {
        field_samples: u64::from(difficulty) * 100,
        symmetry_group: SYMMETRY_GROUP.to_string(),
        checks,
        score: 1.0 / (1.0 + total_error),
        all_satisfied,
    }
}

fn check(name: &str, expected: f64, observed: f64) -> ConstraintCheck {
    ConstraintCheck {
        name: name.to_string(),
        expected,
        observed,
        deviation: (observed - expected).abs(),
    }
}
