//! Signature and replay verification adapters

use dl_01_computation::ComputationEngine;
use dl_04_consensus::WorkVerifier;
use dl_05_integrity::DeepVerifier;
use shared_types::WorkUnit;

/// Re-derives the digest of a unit through the signature module.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    fn check(unit: &WorkUnit) -> Result<bool, String> {
        match unit.signature.as_deref() {
            Some(signature) => {
                dl_03_work_signature::verify(unit, signature).map_err(|e| e.to_string())
            }
            None => Ok(false),
        }
    }
}

impl WorkVerifier for SignatureVerifier {
    fn verify(&self, unit: &WorkUnit) -> Result<bool, String> {
        Self::check(unit)
    }
}

/// Signature check plus bit-for-bit recomputation.
#[derive(Clone)]
pub struct ReplayVerifier {
    engine: ComputationEngine,
}

impl ReplayVerifier {
    pub fn new(engine: ComputationEngine) -> Self {
        Self { engine }
    }
}

impl DeepVerifier for ReplayVerifier {
    fn verify_signature(&self, unit: &WorkUnit) -> Result<bool, String> {
        SignatureVerifier::check(unit)
    }

    fn reproduce(&self, unit: &WorkUnit) -> Result<bool, String> {
        self.engine.reverify(unit).map_err(|e| e.to_string())
    }
}
