//! # Work Computation Engine
//!
//! `compute(request) -> WorkOutput` for every [`WorkType`]. Identical
//! `(work_type, params, difficulty, seed)` always yields bit-identical
//! results, cost and precision; [`ComputationEngine::reverify`] relies on it.

use std::sync::Arc;

use shared_types::{
    sha256, to_hex, VerificationData, WorkParams, WorkResult, WorkType, WorkUnit, MAX_DIFFICULTY,
    MIN_DIFFICULTY,
};

use crate::domain::{
    declared_cost, invariants, patterns, zeros, ComputationError, ComputationResult, CostMetrics,
    EntropySource, GaugeInputs, PrimeCache, DEFAULT_SIEVE_LIMIT,
};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound of the precomputed sieve.
    pub sieve_limit: u64,
    /// Widest range a single pattern scan may cover.
    pub max_range_span: u64,
    /// Highest integer a pattern scan may reach.
    pub max_range_end: u64,
    /// Highest zero index accepted.
    pub max_zero_index: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sieve_limit: DEFAULT_SIEVE_LIMIT,
            max_range_span: 1_000_000,
            max_range_end: 50_000_000,
            max_zero_index: 1_000_000_000,
        }
    }
}

/// A request to compute one unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeRequest {
    pub work_type: WorkType,
    pub params: WorkParams,
    pub difficulty: u32,
    /// Seed for deriving omitted parameters. `None` means omitted
    /// parameters are an error.
    pub seed: Option<u64>,
}

impl ComputeRequest {
    /// Request with every derivable parameter left to difficulty and seed.
    pub fn derived(work_type: WorkType, difficulty: u32, seed: Option<u64>) -> Self {
        Self {
            work_type,
            params: WorkParams::derived(work_type),
            difficulty,
            seed,
        }
    }

    /// Derived request for a work type given by wire name.
    pub fn by_name(name: &str, difficulty: u32, seed: Option<u64>) -> ComputationResult<Self> {
        let work_type = WorkType::from_name(name).ok_or_else(|| {
            ComputationError::InvalidParameters(format!("unknown work type {name:?}"))
        })?;
        Ok(Self::derived(work_type, difficulty, seed))
    }
}

/// Everything the engine produces for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOutput {
    pub work_type: WorkType,
    pub difficulty: u32,
    /// Parameters with every optional field resolved.
    pub params: WorkParams,
    pub seed: Option<u64>,
    pub result: WorkResult,
    pub verification: VerificationData,
    pub cost: CostMetrics,
    /// Certified significant decimal digits.
    pub precision: f64,
}

/// Deterministic computation engine.
#[derive(Clone)]
pub struct ComputationEngine {
    cache: Arc<PrimeCache>,
    config: EngineConfig,
}

impl ComputationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = Arc::new(PrimeCache::new(config.sieve_limit));
        Self { cache, config }
    }

    /// Engine sharing an existing cache.
    pub fn with_cache(config: EngineConfig, cache: Arc<PrimeCache>) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &Arc<PrimeCache> {
        &self.cache
    }

    /// Compute a work result.
    ///
    /// # Errors
    /// - `InvalidDifficulty` outside `1..=1000`
    /// - `WorkTypeMismatch` when `params` belong to another family
    /// - `InvalidParameters` on type-specific range failures
    /// - `MissingEntropy` when a parameter must be derived but no seed is set
    pub fn compute(&self, request: &ComputeRequest) -> ComputationResult<WorkOutput> {
        let difficulty = request.difficulty;
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(ComputationError::InvalidDifficulty { difficulty });
        }
        if request.params.work_type() != request.work_type {
            return Err(ComputationError::WorkTypeMismatch {
                expected: request.work_type,
                actual: request.params.work_type(),
            });
        }

        let mut entropy = EntropySource::new(request.seed);
        let (params, result, verification, precision) = match &request.params {
            WorkParams::ZeroFinding { zero_index } => {
                self.compute_zero(*zero_index, difficulty, &mut entropy)?
            }
            WorkParams::PatternDiscovery {
                range_start,
                range_end,
                gap,
            } => self.compute_pattern(*range_start, *range_end, *gap, difficulty)?,
            WorkParams::InvariantValidation {
                field_strength,
                coupling,
                energy_density,
                action,
                mass_gap,
            } => {
                let inputs = resolve_gauge_inputs(
                    [*field_strength, *coupling, *energy_density, *action, *mass_gap],
                    &mut entropy,
                )?;
                compute_invariants(inputs, difficulty)
            }
        };

        let cost = declared_cost(request.work_type, difficulty, result.result_size());

        tracing::debug!(
            work_type = %request.work_type,
            difficulty,
            findings = result.result_size(),
            cost = cost.computational_cost,
            "Computation complete"
        );

        Ok(WorkOutput {
            work_type: request.work_type,
            difficulty,
            params,
            seed: request.seed,
            result,
            verification,
            cost,
            precision,
        })
    }

    /// Recompute `unit` from its stored inputs and compare bit-for-bit.
    pub fn reverify(&self, unit: &WorkUnit) -> ComputationResult<bool> {
        let output = self.compute(&ComputeRequest {
            work_type: unit.work_type,
            params: unit.params.clone(),
            difficulty: unit.difficulty,
            seed: unit.seed,
        })?;

        Ok(output.result == unit.result
            && output.verification == unit.verification
            && output.cost.computational_cost.to_bits() == unit.computational_cost.to_bits()
            && output.cost.energy_consumed.to_bits() == unit.energy_consumed.to_bits()
            && output.precision.to_bits() == unit.precision.to_bits())
    }

    fn compute_zero(
        &self,
        zero_index: Option<u64>,
        difficulty: u32,
        entropy: &mut EntropySource,
    ) -> ComputationResult<(WorkParams, WorkResult, VerificationData, f64)> {
        let index = match zero_index {
            Some(i) => i,
            None => entropy.int_in("zero_index", 1, 100)?,
        };
        if index == 0 || index > self.config.max_zero_index {
            return Err(ComputationError::InvalidParameters(format!(
                "zero_index {index} outside 1..={}",
                self.config.max_zero_index
            )));
        }

        let zero = zeros::find_zero(index, difficulty);
        let method = if zero.catalogued {
            "reference_catalog"
        } else {
            "riemann_von_mangoldt_newton"
        };
        let mut preimage = Vec::with_capacity(16);
        preimage.extend_from_slice(&index.to_be_bytes());
        preimage.extend_from_slice(&zero.imaginary.to_bits().to_be_bytes());

        let precision = f64::from(zero.precision_digits);
        Ok((
            WorkParams::ZeroFinding {
                zero_index: Some(index),
            },
            WorkResult::ZeroFinding(zero),
            VerificationData::ZeroFinding {
                method: method.to_string(),
                verification_hash: to_hex(&sha256(&preimage)),
            },
            precision,
        ))
    }

    fn compute_pattern(
        &self,
        range_start: Option<u64>,
        range_end: Option<u64>,
        gap: u64,
        difficulty: u32,
    ) -> ComputationResult<(WorkParams, WorkResult, VerificationData, f64)> {
        if gap < 2 || gap % 2 != 0 {
            return Err(ComputationError::InvalidParameters(format!(
                "gap {gap} must be even and at least 2"
            )));
        }

        let d = u64::from(difficulty);
        let start = range_start.unwrap_or(100_000 + d * 1_000);
        let end = range_end.unwrap_or(start.saturating_add(d * 500));
        if start >= end {
            return Err(ComputationError::InvalidParameters(format!(
                "empty range [{start}, {end})"
            )));
        }
        if end - start > self.config.max_range_span {
            return Err(ComputationError::InvalidParameters(format!(
                "range span {} exceeds {}",
                end - start,
                self.config.max_range_span
            )));
        }
        if end > self.config.max_range_end {
            return Err(ComputationError::InvalidParameters(format!(
                "range end {end} exceeds {}",
                self.config.max_range_end
            )));
        }

        let scan = patterns::scan(&self.cache, start, end, gap);
        Ok((
            WorkParams::PatternDiscovery {
                range_start: Some(start),
                range_end: Some(end),
                gap,
            },
            WorkResult::PatternDiscovery(scan.result),
            VerificationData::PatternDiscovery {
                method: "sieve_of_eratosthenes".to_string(),
                primes_digest: to_hex(&scan.primes_digest),
                pattern_density: scan.pattern_density,
            },
            f64::from(f64::DIGITS),
        ))
    }
}

impl Default for ComputationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Resolve `[field_strength, coupling, energy_density, action, mass_gap]`.
///
/// Identity-determined values (`energy_density`, `action`) are derived
/// exactly; free scalars come from the entropy source.
fn resolve_gauge_inputs(
    supplied: [Option<f64>; 5],
    entropy: &mut EntropySource,
) -> ComputationResult<GaugeInputs> {
    let [field_strength, coupling, energy_density, action, mass_gap] = supplied;

    let field_strength = match field_strength {
        Some(v) => v,
        None => entropy.float_in("field_strength", 10.0, 50.0)?,
    };
    let coupling = match coupling {
        Some(v) => v,
        None => entropy.float_in("coupling", 0.5, 2.0)?,
    };
    let mass_gap = match mass_gap {
        Some(v) => v,
        None => entropy.float_in("mass_gap", 0.5, 2.0)?,
    };

    let inputs = GaugeInputs {
        field_strength,
        coupling,
        energy_density: energy_density
            .unwrap_or_else(|| invariants::expected_energy_density(field_strength)),
        action: action.unwrap_or_else(|| invariants::expected_action(field_strength, coupling)),
        mass_gap,
    };

    let all_finite = [
        inputs.field_strength,
        inputs.coupling,
        inputs.energy_density,
        inputs.action,
        inputs.mass_gap,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !all_finite {
        return Err(ComputationError::InvalidParameters(
            "gauge parameters must be finite".to_string(),
        ));
    }
    if inputs.coupling == 0.0 {
        return Err(ComputationError::InvalidParameters(
            "coupling must be non-zero".to_string(),
        ));
    }
    Ok(inputs)
}

fn compute_invariants(
    inputs: GaugeInputs,
    difficulty: u32,
) -> (WorkParams, WorkResult, VerificationData, f64) {
    let result = invariants::validate(&inputs, difficulty);

    let mut preimage = Vec::with_capacity(result.checks.len() * 8);
    for c in &result.checks {
        preimage.extend_from_slice(&c.deviation.to_bits().to_be_bytes());
    }
    let total_error: f64 = result.checks.iter().map(|c| c.deviation).sum();
    let max_digits = f64::from(f64::DIGITS);
    let precision = if total_error <= 1e-15 {
        max_digits
    } else {
        (-total_error.log10()).clamp(0.0, max_digits)
    };

    (
        WorkParams::InvariantValidation {
            field_strength: Some(inputs.field_strength),
            coupling: Some(inputs.coupling),
            energy_density: Some(inputs.energy_density),
            action: Some(inputs.action),
            mass_gap: Some(inputs.mass_gap),
        },
        WorkResult::InvariantValidation(result),
        VerificationData::InvariantValidation {
            method: "gauge_identity_check".to_string(),
            deviations_digest: to_hex(&sha256(&preimage)),
            mass_gap_confirmed: inputs.mass_gap > 0.0,
        },
        precision,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ComputationEngine {
        ComputationEngine::default()
    }

    #[test]
    fn test_rejects_invalid_difficulty() {
        let e = engine();
        for difficulty in [0, MAX_DIFFICULTY + 1] {
            let req = ComputeRequest::derived(WorkType::PrimePattern, difficulty, Some(1));
            assert_eq!(
                e.compute(&req),
                Err(ComputationError::InvalidDifficulty { difficulty })
            );
        }
    }

    #[test]
    fn test_rejects_mismatched_params() {
        let req = ComputeRequest {
            work_type: WorkType::RiemannZero,
            params: WorkParams::derived(WorkType::YangMills),
            difficulty: 5,
            seed: Some(1),
        };
        assert!(matches!(
            engine().compute(&req),
            Err(ComputationError::WorkTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_without_seed_or_index_fails() {
        let req = ComputeRequest::derived(WorkType::RiemannZero, 5, None);
        assert_eq!(
            engine().compute(&req),
            Err(ComputationError::MissingEntropy("zero_index"))
        );
    }

    #[test]
    fn test_zero_with_explicit_index_needs_no_seed() {
        let req = ComputeRequest {
            work_type: WorkType::RiemannZero,
            params: WorkParams::ZeroFinding { zero_index: Some(3) },
            difficulty: 7,
            seed: None,
        };
        let out = engine().compute(&req).unwrap();
        match out.result {
            WorkResult::ZeroFinding(z) => {
                assert!(z.catalogued);
                assert_eq!(z.imaginary, zeros::ZERO_CATALOG[2]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let e = engine();
        for t in WorkType::ALL {
            let req = ComputeRequest::derived(t, 12, Some(0xC0FFEE));
            let a = e.compute(&req).unwrap();
            let b = e.compute(&req).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.precision.to_bits(), b.precision.to_bits());
        }
    }

    #[test]
    fn test_pattern_default_range_from_difficulty() {
        let out = engine()
            .compute(&ComputeRequest::derived(WorkType::PrimePattern, 4, None))
            .unwrap();
        assert_eq!(
            out.params,
            WorkParams::PatternDiscovery {
                range_start: Some(104_000),
                range_end: Some(106_000),
                gap: 2,
            }
        );
        let WorkResult::PatternDiscovery(result) = out.result else {
            panic!("expected pattern result");
        };
        assert!(result.patterns_found > 0);
        assert!(result.primes_found > result.patterns_found);
    }

    #[test]
    fn test_pattern_rejects_bad_ranges() {
        let e = engine();
        let cases = [
            (Some(500), Some(500), 2),
            (Some(500), Some(100), 2),
            (Some(1), Some(5_000_000), 2),
            (Some(10), Some(100), 3),
            (Some(10), Some(100), 0),
        ];
        for (start, end, gap) in cases {
            let req = ComputeRequest {
                work_type: WorkType::PrimePattern,
                params: WorkParams::PatternDiscovery {
                    range_start: start,
                    range_end: end,
                    gap,
                },
                difficulty: 1,
                seed: None,
            };
            assert!(
                matches!(e.compute(&req), Err(ComputationError::InvalidParameters(_))),
                "accepted {start:?}..{end:?} gap {gap}"
            );
        }
    }

    #[test]
    fn test_request_by_name() {
        let req = ComputeRequest::by_name("yang_mills", 4, Some(1)).unwrap();
        assert_eq!(req.work_type, WorkType::YangMills);
        assert!(matches!(
            ComputeRequest::by_name("navier_stokes", 4, Some(1)),
            Err(ComputationError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_invariants_reject_zero_coupling() {
        let req = ComputeRequest {
            work_type: WorkType::YangMills,
            params: WorkParams::InvariantValidation {
                field_strength: Some(10.0),
                coupling: Some(0.0),
                energy_density: None,
                action: None,
                mass_gap: Some(1.0),
            },
            difficulty: 3,
            seed: None,
        };
        assert!(matches!(
            engine().compute(&req),
            Err(ComputationError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_invariants_with_caller_scalars() {
        let req = ComputeRequest {
            work_type: WorkType::YangMills,
            params: WorkParams::InvariantValidation {
                field_strength: Some(2.0),
                coupling: Some(1.0),
                energy_density: Some(2.0),
                action: Some(1.0),
                mass_gap: Some(0.7),
            },
            difficulty: 3,
            seed: None,
        };
        let out = engine().compute(&req).unwrap();
        let WorkResult::InvariantValidation(result) = &out.result else {
            panic!("expected invariant result");
        };
        assert!(result.all_satisfied);
        assert_eq!(result.score, 1.0);
        assert_eq!(out.precision, f64::from(f64::DIGITS));
    }

    #[test]
    fn test_cost_grows_with_difficulty() {
        let e = engine();
        let params = WorkParams::ZeroFinding { zero_index: Some(50) };
        let cost = |d| {
            e.compute(&ComputeRequest {
                work_type: WorkType::RiemannZero,
                params: params.clone(),
                difficulty: d,
                seed: None,
            })
            .unwrap()
            .cost
            .computational_cost
        };
        assert!(cost(10) < cost(20));
    }
}
