//! # dl-02-valuation
//!
//! Maps `(work_type, result, difficulty)` to a scientific value expressed as
//! a research-grant equivalent.
//!
//! ## Formula
//!
//! ```text
//! difficulty_multiplier = min(1 + d/1000 * 0.5, 1.5)
//! cost_component        = min(d * 0.15 + findings * 0.05, 200)
//! quality_multiplier    = 1 + 0.5 * rarity(result)          in [1, 1.5]
//! total = clamp((base + impact * difficulty_multiplier + cost_component)
//!               * quality_multiplier, 1200, 3500)
//! ```
//!
//! Every term is non-decreasing in difficulty and in result rarity, and none
//! depends on wall-clock time.

pub mod table;

use serde::{Deserialize, Serialize};
use shared_types::{WorkResult, WorkType};

pub use table::{base_value, research_impact};

/// Valuation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("Result of type {actual} cannot be valued as {expected}")]
    WorkTypeMismatch { expected: WorkType, actual: WorkType },
}

pub type ValuationResult<T> = Result<T, ValuationError>;

/// Valuation bounds and scaling
#[derive(Debug, Clone)]
pub struct ValuationConfig {
    pub min_value: f64,
    pub max_value: f64,
    pub max_difficulty_multiplier: f64,
    pub cost_cap: f64,
    pub cost_per_difficulty: f64,
    pub cost_per_finding: f64,
    pub max_quality_bonus: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            min_value: 1200.0,
            max_value: 3500.0,
            max_difficulty_multiplier: 1.5,
            cost_cap: 200.0,
            cost_per_difficulty: 0.15,
            cost_per_finding: 0.05,
            max_quality_bonus: 0.5,
        }
    }
}

/// Breakdown of a valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub base_value: f64,
    /// Research impact after the difficulty multiplier.
    pub research_impact: f64,
    pub cost_component: f64,
    pub difficulty_multiplier: f64,
    pub quality_multiplier: f64,
    pub total_value: f64,
    pub methodology: String,
}

/// Stateless valuation engine.
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: ValuationConfig,
}

impl ValuationEngine {
    pub fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    /// Value `result` computed for `work_type` at `difficulty`.
    pub fn valuate(
        &self,
        work_type: WorkType,
        result: &WorkResult,
        difficulty: u32,
    ) -> ValuationResult<Valuation> {
        if result.work_type() != work_type {
            return Err(ValuationError::WorkTypeMismatch {
                expected: work_type,
                actual: result.work_type(),
            });
        }

        let cfg = &self.config;
        let d = f64::from(difficulty);

        let base = base_value(work_type);
        let difficulty_multiplier = (1.0 + d / 1000.0 * 0.5).min(cfg.max_difficulty_multiplier);
        let impact = research_impact(work_type) * difficulty_multiplier;
        let cost_component = (d * cfg.cost_per_difficulty
            + result.result_size() as f64 * cfg.cost_per_finding)
            .min(cfg.cost_cap);
        let quality_multiplier = 1.0 + cfg.max_quality_bonus * rarity(result);

        let raw = (base + impact + cost_component) * quality_multiplier;
        let total_value = raw.clamp(cfg.min_value, cfg.max_value);

        tracing::debug!(
            work_type = %work_type,
            difficulty,
            total_value,
            quality_multiplier,
            "Work valuated"
        );

        Ok(Valuation {
            base_value: base,
            research_impact: impact,
            cost_component,
            difficulty_multiplier,
            quality_multiplier,
            total_value,
            methodology: format!("Research grant equivalent for {work_type} at difficulty {difficulty}"),
        })
    }
}

/// Rarity of a result in `[0, 1]`.
///
/// - zero finding: certified precision and zero height
/// - pattern discovery: pattern count and mean resonance
/// - invariant validation: composite score, discounted when a constraint fails
pub fn rarity(result: &WorkResult) -> f64 {
    let r = match result {
        WorkResult::ZeroFinding(z) => {
            let precision = (f64::from(z.precision_digits) / 1010.0).min(1.0);
            let height = ((z.zero_index.max(1) as f64).log10() / 9.0).min(1.0);
            0.5 * precision + 0.5 * height
        }
        WorkResult::PatternDiscovery(p) => {
            let count = (p.patterns_found as f64 / 100.0).min(1.0);
            0.5 * count + 0.5 * p.avg_resonance
        }
        WorkResult::InvariantValidation(v) => {
            if v.all_satisfied {
                v.score
            } else {
                v.score * 0.8
            }
        }
    };
    if r.is_finite() {
        r.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
