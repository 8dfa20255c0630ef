//! # dl-03-work-signature
//!
//! Tamper-evident digests over work units.
//!
//! `sign(work, worker_id)` canonicalizes the unit's deterministic fields and
//! hashes them with SHA-256 into a 64-character lowercase hex string.
//! `verify(work, signature)` rebuilds the digest from the unit and compares
//! for exact equality, so any single-field mutation is detected.
//!
//! ## Errors
//!
//! A unit whose canonical form cannot be rebuilt (empty worker id, zero
//! difficulty, non-finite numbers, payload/type mismatch) fails
//! verification with [`SignatureError::SignatureMismatch`] rather than
//! returning `false`.

mod canonical;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::WorkUnit;
use std::fmt;

pub use canonical::canonical_bytes;

/// Length of a hex-encoded signature.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Signature errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignatureError {
    /// Verification could not be carried out or did not match.
    #[error("Signature mismatch: {0}")]
    SignatureMismatch(String),

    /// The unit cannot be signed.
    #[error("Unsignable payload: {0}")]
    UnsignablePayload(String),
}

pub type SignatureResult<T> = Result<T, SignatureError>;

/// Hex-encoded SHA-256 work signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkSignature(String);

impl WorkSignature {
    /// Parse a 64-char lowercase hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let well_formed = s.len() == SIGNATURE_HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WorkSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn digest(bytes: &[u8]) -> WorkSignature {
    WorkSignature(hex::encode(Sha256::digest(bytes)))
}

/// Sign `work` on behalf of `worker_id`.
pub fn sign(work: &WorkUnit, worker_id: &str) -> SignatureResult<WorkSignature> {
    let bytes = canonical_bytes(work, worker_id).map_err(SignatureError::UnsignablePayload)?;
    Ok(digest(&bytes))
}

/// Set `worker_id` and `signature` on `work`.
pub fn seal(work: &mut WorkUnit, worker_id: &str) -> SignatureResult<()> {
    work.worker_id = worker_id.to_string();
    let signature = sign(work, worker_id)?;
    work.signature = Some(signature.into_string());
    Ok(())
}

/// Recompute the digest of `work` and compare with `signature`.
///
/// # Errors
/// `SignatureMismatch` when the canonical form cannot be rebuilt.
pub fn verify(work: &WorkUnit, signature: &str) -> SignatureResult<bool> {
    let bytes = canonical_bytes(work, &work.worker_id).map_err(SignatureError::SignatureMismatch)?;
    let expected = digest(&bytes);
    let matches = expected.as_str().as_bytes() == signature.as_bytes();
    if !matches {
        tracing::debug!(work_id = %work.id, "Work signature mismatch");
    }
    Ok(matches)
}

/// Verify the signature carried by `work`, mapping every failure to
/// `SignatureMismatch`.
pub fn ensure_signed(work: &WorkUnit) -> SignatureResult<()> {
    let signature = work
        .signature
        .as_deref()
        .ok_or_else(|| SignatureError::SignatureMismatch(format!("{} is unsigned", work.id)))?;
    if verify(work, signature)? {
        Ok(())
    } else {
        Err(SignatureError::SignatureMismatch(format!(
            "{} digest does not match its contents",
            work.id
        )))
    }
}
