//! Canonical byte form of a work unit.
//!
//! Every deterministic field except `status` and `signature`, plus the
//! worker id and a millisecond RFC 3339 timestamp, encoded with bincode.
//! Floats are carried as raw bits so the encoding is exact.

use chrono::SecondsFormat;
use serde::Serialize;
use shared_types::{VerificationData, WorkParams, WorkResult, WorkType, WorkUnit};

#[derive(Serialize)]
struct CanonicalWork<'a> {
    id: u64,
    work_type: WorkType,
    difficulty: u32,
    params: &'a WorkParams,
    seed: Option<u64>,
    result: &'a WorkResult,
    verification: &'a VerificationData,
    computational_cost: u64,
    energy_efficiency: u64,
    energy_consumed: u64,
    precision: u64,
    scientific_value: u64,
    worker_id: &'a str,
    timestamp: String,
}

/// Why a unit has no canonical form.
pub(crate) fn incomplete_reason(work: &WorkUnit, worker_id: &str) -> Option<String> {
    if worker_id.trim().is_empty() {
        return Some("worker id is empty".to_string());
    }
    if work.difficulty == 0 {
        return Some("difficulty is zero".to_string());
    }
    if work.result.work_type() != work.work_type || work.params.work_type() != work.work_type {
        return Some(format!("payload does not match work type {}", work.work_type));
    }
    let scalars = [
        work.computational_cost,
        work.energy_efficiency,
        work.energy_consumed,
        work.precision,
        work.scientific_value,
    ];
    if !scalars.iter().all(|v| v.is_finite())
        || !work.result.is_finite()
        || !work.verification.is_finite()
    {
        return Some("non-finite numeric field".to_string());
    }
    None
}

/// Canonical bytes, or the reason they cannot be built.
pub fn canonical_bytes(work: &WorkUnit, worker_id: &str) -> Result<Vec<u8>, String> {
    if let Some(reason) = incomplete_reason(work, worker_id) {
        return Err(reason);
    }
    let canonical = CanonicalWork {
        id: work.id.0,
        work_type: work.work_type,
        difficulty: work.difficulty,
        params: &work.params,
        seed: work.seed,
        result: &work.result,
        verification: &work.verification,
        computational_cost: work.computational_cost.to_bits(),
        energy_efficiency: work.energy_efficiency.to_bits(),
        energy_consumed: work.energy_consumed.to_bits(),
        precision: work.precision.to_bits(),
        scientific_value: work.scientific_value.to_bits(),
        worker_id,
        timestamp: work.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    bincode::serialize(&canonical).map_err(|e| e.to_string())
}
