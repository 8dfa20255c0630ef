//! Driven ports

use shared_types::WorkUnit;

/// Re-derivation used by deep sweeps.
///
/// Either method returning `Err` counts as a mismatch.
pub trait DeepVerifier: Send + Sync {
    /// Whether the unit's signature matches its contents.
    fn verify_signature(&self, unit: &WorkUnit) -> Result<bool, String>;

    /// Whether recomputing the unit reproduces its stored result.
    fn reproduce(&self, unit: &WorkUnit) -> Result<bool, String>;
}
