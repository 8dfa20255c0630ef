//! # Declared Cost Model
//!
//! Cost and energy are declared functions of difficulty and result size,
//! never wall-clock measurements, so valuation reproduces on any host.

use shared_types::WorkType;

/// Cost metrics attached to a work unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostMetrics {
    /// Abstract compute units.
    pub computational_cost: f64,
    /// Declared energy in kWh.
    pub energy_consumed: f64,
    /// Findings per kWh.
    pub energy_efficiency: f64,
}

/// Compute units charged per difficulty step.
pub fn unit_weight(work_type: WorkType) -> f64 {
    match work_type {
        WorkType::RiemannZero => 1.0,
        WorkType::PrimePattern => 0.8,
        WorkType::YangMills => 1.25,
    }
}

/// Declared power draw per compute unit, in kWh.
pub fn energy_per_unit(work_type: WorkType) -> f64 {
    match work_type {
        WorkType::RiemannZero => 0.000_5,
        WorkType::PrimePattern => 0.000_6,
        WorkType::YangMills => 0.000_8,
    }
}

/// Extra compute units per finding.
const RESULT_UNIT_WEIGHT: f64 = 0.01;

/// Cost for `work_type` at `difficulty` producing `result_size` findings.
///
/// Monotone non-decreasing in both `difficulty` and `result_size`.
pub fn declared_cost(work_type: WorkType, difficulty: u32, result_size: u64) -> CostMetrics {
    let computational_cost =
        f64::from(difficulty) * unit_weight(work_type) + result_size as f64 * RESULT_UNIT_WEIGHT;
    let energy_consumed = computational_cost * energy_per_unit(work_type);
    let energy_efficiency = (result_size.max(1)) as f64 / energy_consumed;

    CostMetrics {
        computational_cost,
        energy_consumed,
        energy_efficiency,
    }
}
