//! Structural rules applied to a ledger snapshot.

use super::{EnforcementReport, EntityCounts, IntegrityConfig, IntegrityViolation};
use crate::ports::DeepVerifier;
use shared_types::{
    leading_zero_bits, merkle_root, work_leaf_hash, Block, LedgerSnapshot, WorkId, WorkStatus,
    WorkUnit, ZERO_HASH,
};
use std::collections::{HashMap, HashSet};

/// Per-record classification of one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub blocks: EntityCounts,
    pub work_units: EntityCounts,
    pub validations: EntityCounts,
    pub violations: Vec<IntegrityViolation>,
    /// Index of the earliest block that failed any check.
    pub first_invalid_block: Option<u64>,
}

impl Evaluation {
    pub fn total(&self) -> u64 {
        self.blocks.total() + self.work_units.total() + self.validations.total()
    }

    pub fn valid(&self) -> u64 {
        self.blocks.valid + self.work_units.valid + self.validations.valid
    }

    /// `valid / total * 100`; an empty ledger scores 100.
    pub fn score(&self) -> f64 {
        match self.total() {
            0 => 100.0,
            total => self.valid() as f64 / total as f64 * 100.0,
        }
    }
}

/// False for zero, negatives and NaN.
fn positive(value: f64) -> bool {
    value > 0.0
}

/// Distinct non-empty validators per existing work unit.
fn distinct_validators(snapshot: &LedgerSnapshot) -> HashMap<WorkId, usize> {
    let known: HashSet<WorkId> = snapshot.work_units.iter().map(|u| u.id).collect();
    let mut voters: HashMap<WorkId, HashSet<&str>> = HashMap::new();
    for v in &snapshot.validations {
        if known.contains(&v.work_id) && !v.validator_id.trim().is_empty() {
            voters.entry(v.work_id).or_default().insert(v.validator_id.as_str());
        }
    }
    voters.into_iter().map(|(id, set)| (id, set.len())).collect()
}

fn check_block(
    block: &Block,
    position: usize,
    previous: Option<&Block>,
    units: &HashMap<WorkId, &WorkUnit>,
    sealed: &mut HashSet<WorkId>,
) -> Vec<IntegrityViolation> {
    let index = block.index;
    let mut found = Vec::new();

    if block.block_hash == ZERO_HASH
        || block.merkle_root == ZERO_HASH
        || (position > 0 && block.previous_hash == ZERO_HASH)
    {
        found.push(IntegrityViolation::MissingHash { index });
    }
    if !positive(block.total_scientific_value) {
        found.push(IntegrityViolation::NonPositiveBlockValue {
            index,
            value: block.total_scientific_value,
        });
    }
    if block.difficulty == 0 {
        found.push(IntegrityViolation::ZeroBlockDifficulty { index });
    }
    if index != position as u64 {
        found.push(IntegrityViolation::IndexGap { position, index });
    }

    let expected_previous = previous.map_or(ZERO_HASH, |p| p.block_hash);
    if block.previous_hash != expected_previous {
        found.push(IntegrityViolation::BrokenLinkage { index });
    }

    if block.compute_hash() != block.block_hash {
        found.push(IntegrityViolation::HashMismatch { index });
    } else if leading_zero_bits(&block.block_hash) < block.difficulty {
        found.push(IntegrityViolation::InsufficientWork { index });
    }

    let mut leaves = Vec::with_capacity(block.work_ids.len());
    let mut complete = true;
    for &work_id in &block.work_ids {
        if !sealed.insert(work_id) {
            found.push(IntegrityViolation::DuplicateInclusion { index, work_id });
        }
        let Some(unit) = units.get(&work_id) else {
            found.push(IntegrityViolation::UnknownWorkReference { index, work_id });
            complete = false;
            continue;
        };
        if unit.status != WorkStatus::Finalized {
            found.push(IntegrityViolation::UnfinalizedInclusion { index, work_id });
        }
        match unit.signature.as_deref() {
            Some(sig) if !sig.is_empty() => leaves.push(work_leaf_hash(work_id, sig)),
            _ => complete = false,
        }
    }
    if complete && merkle_root(&leaves) != block.merkle_root {
        found.push(IntegrityViolation::MerkleMismatch { index });
    }

    found
}

fn check_unit(
    unit: &WorkUnit,
    validators: &HashMap<WorkId, usize>,
    config: &IntegrityConfig,
    deep: Option<&dyn DeepVerifier>,
) -> Vec<IntegrityViolation> {
    let id = unit.id;
    let mut found = Vec::new();

    if !unit.is_signed() {
        found.push(IntegrityViolation::MissingSignature(id));
    }
    if !positive(unit.scientific_value) {
        found.push(IntegrityViolation::NonPositiveWorkValue {
            work_id: id,
            value: unit.scientific_value,
        });
    }
    if unit.difficulty == 0 {
        found.push(IntegrityViolation::ZeroWorkDifficulty(id));
    }
    if unit.worker_id.trim().is_empty() {
        found.push(IntegrityViolation::MissingWorker(id));
    }
    if unit.status.is_accepted() {
        let validations = validators.get(&id).copied().unwrap_or(0);
        if validations < config.min_validations {
            found.push(IntegrityViolation::UnderValidated {
                work_id: id,
                validations,
                required: config.min_validations,
            });
        }
    }

    if let Some(deep) = deep.filter(|_| config.deep_verification) {
        if unit.is_signed() && !deep.verify_signature(unit).unwrap_or(false) {
            found.push(IntegrityViolation::SignatureMismatch(id));
        }
        if !deep.reproduce(unit).unwrap_or(false) {
            found.push(IntegrityViolation::ResultMismatch(id));
        }
    }

    found
}

/// Classify every record of `snapshot`.
pub fn evaluate(
    snapshot: &LedgerSnapshot,
    config: &IntegrityConfig,
    deep: Option<&dyn DeepVerifier>,
) -> Evaluation {
    let mut ev = Evaluation::default();
    let units: HashMap<WorkId, &WorkUnit> = snapshot.work_units.iter().map(|u| (u.id, u)).collect();

    let mut sealed = HashSet::new();
    let mut previous = None;
    for (position, block) in snapshot.blocks.iter().enumerate() {
        let found = check_block(block, position, previous, &units, &mut sealed);
        if !found.is_empty() && ev.first_invalid_block.is_none() {
            ev.first_invalid_block = Some(block.index);
        }
        ev.blocks.tally(found.is_empty());
        ev.violations.extend(found);
        previous = Some(block);
    }

    let validators = distinct_validators(snapshot);
    for unit in &snapshot.work_units {
        let found = check_unit(unit, &validators, config, deep);
        ev.work_units.tally(found.is_empty());
        ev.violations.extend(found);
    }

    let mut seen = HashSet::new();
    for v in &snapshot.validations {
        let mut found = Vec::new();
        if v.validator_id.trim().is_empty() {
            found.push(IntegrityViolation::EmptyValidator(v.work_id));
        } else if !seen.insert((v.work_id, v.validator_id.as_str())) {
            found.push(IntegrityViolation::DuplicateValidation {
                work_id: v.work_id,
                validator: v.validator_id.clone(),
            });
        }
        if !units.contains_key(&v.work_id) {
            found.push(IntegrityViolation::OrphanValidation {
                work_id: v.work_id,
                validator: v.validator_id.clone(),
            });
        }
        ev.validations.tally(found.is_empty());
        ev.violations.extend(found);
    }

    ev
}

/// Flag non-positive-value blocks, incomplete work records and
/// under-validated discoveries.
pub fn enforce(snapshot: &LedgerSnapshot, config: &IntegrityConfig) -> EnforcementReport {
    let mut report = EnforcementReport::default();

    for block in &snapshot.blocks {
        if !positive(block.total_scientific_value) {
            report.non_positive_blocks += 1;
            report.actions.push(format!(
                "Flag block {} for revaluation: scientific value {}",
                block.index, block.total_scientific_value
            ));
        }
    }

    let validators = distinct_validators(snapshot);
    for unit in &snapshot.work_units {
        let mut reasons = Vec::new();
        if !unit.is_signed() {
            reasons.push("missing signature");
        }
        if unit.worker_id.trim().is_empty() {
            reasons.push("missing worker");
        }
        if !positive(unit.scientific_value) {
            reasons.push("non-positive value");
        }
        if unit.difficulty == 0 {
            reasons.push("zero difficulty");
        }
        if !reasons.is_empty() {
            report.incomplete_work += 1;
            report
                .actions
                .push(format!("Quarantine {}: {}", unit.id, reasons.join(", ")));
        }

        if unit.status.is_accepted() {
            let have = validators.get(&unit.id).copied().unwrap_or(0);
            if have < config.min_validations {
                report.under_validated += 1;
                report.actions.push(format!(
                    "Request {} more validation(s) for {}",
                    config.min_validations - have,
                    unit.id
                ));
            }
        }
    }

    report.violations_detected =
        report.non_positive_blocks + report.incomplete_work + report.under_validated;
    report
}
