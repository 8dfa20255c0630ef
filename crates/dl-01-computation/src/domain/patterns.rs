//! # Prime Pattern Discovery
//!
//! Scans `[range_start, range_end)` for consecutive primes separated by a
//! fixed gap and scores each pair against the golden ratio.

use shared_types::{sha256, PatternResult};

use super::prime_cache::PrimeCache;

/// Reciprocal of the golden ratio.
pub const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Trailing pairs kept as samples in the result.
pub const SAMPLE_PAIRS: usize = 5;

/// Output of a scan: the result plus facts for verification data.
pub struct PatternScan {
    pub result: PatternResult,
    pub primes_digest: [u8; 32],
    pub pattern_density: f64,
}

/// Conventional name for a prime gap.
pub fn pattern_name(gap: u64) -> String {
    match gap {
        2 => "twin".to_string(),
        4 => "cousin".to_string(),
        6 => "sexy".to_string(),
        g => format!("gap-{g}"),
    }
}

/// Golden-ratio resonance of a pair in `[0, 1]`.
///
/// Distance of `midpoint / phi` from the nearest half-integer, rescaled so
/// an exact half-integer scores 1.
pub fn resonance(p: u64, q: u64) -> f64 {
    let midpoint = (p as f64 + q as f64) / 2.0;
    let x = (midpoint * INV_PHI).fract();
    1.0 - (2.0 * x - 1.0).abs()
}

/// Scan a range. Callers validate `range_start < range_end` and `gap >= 2`.
pub fn scan(cache: &PrimeCache, range_start: u64, range_end: u64, gap: u64) -> PatternScan {
    let primes = cache.primes_in_range(range_start, range_end);

    let mut pairs = Vec::new();
    let mut largest_gap = 0;
    for w in primes.windows(2) {
        let diff = w[1] - w[0];
        largest_gap = largest_gap.max(diff);
        if diff == gap {
            pairs.push((w[0], w[1]));
        }
    }

    let patterns_found = pairs.len() as u64;
    let avg_resonance = if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|&(p, q)| resonance(p, q)).sum::<f64>() / pairs.len() as f64
    };

    let span = (range_end - range_start) as f64;
    let pattern_density = patterns_found as f64 / span * 100_000.0;

    let mut digest_input = Vec::with_capacity(primes.len() * 8);
    for p in &primes {
        digest_input.extend_from_slice(&p.to_be_bytes());
    }

    let sample_pairs = pairs[pairs.len().saturating_sub(SAMPLE_PAIRS)..].to_vec();

    PatternScan {
        result: PatternResult {
            pattern_type: pattern_name(gap),
            range_start,
            range_end,
            gap,
            patterns_found,
            avg_resonance,
            largest_gap,
            primes_found: primes.len() as u64,
            sample_pairs,
        },
        primes_digest: sha256(&digest_input),
        pattern_density,
    }
}
