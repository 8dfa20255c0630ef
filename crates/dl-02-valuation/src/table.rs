//! Base research values and impact factors per work type.

use shared_types::WorkType;

/// Base research value in grant-equivalent units.
pub fn base_value(work_type: WorkType) -> f64 {
    match work_type {
        WorkType::RiemannZero => 800.0,
        WorkType::PrimePattern => 600.0,
        WorkType::YangMills => 1200.0,
    }
}

/// Research impact before the difficulty multiplier.
pub fn research_impact(work_type: WorkType) -> f64 {
    match work_type {
        WorkType::RiemannZero => 200.0,
        WorkType::PrimePattern => 150.0,
        WorkType::YangMills => 300.0,
    }
}
