//! # In-Memory Ledger
//!
//! Reference [`LedgerRepository`] backed by a single `RwLock`, so a snapshot
//! never interleaves with a block append.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::entities::{Block, Validation, WorkId, WorkStatus, WorkUnit, ZERO_HASH};
use crate::errors::RepositoryError;
use crate::ports::LedgerRepository;

/// Point-in-time copy of the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub blocks: Vec<Block>,
    pub work_units: Vec<WorkUnit>,
    pub validations: Vec<Validation>,
}

impl LedgerSnapshot {
    /// Ids of every unit already sealed into a block.
    pub fn included_work_ids(&self) -> HashSet<WorkId> {
        self.blocks.iter().flat_map(|b| b.work_ids.iter().copied()).collect()
    }

    /// FINALIZED units not yet included in any block, in id order.
    pub fn unassembled_finalized(&self) -> Vec<WorkUnit> {
        let included = self.included_work_ids();
        self.work_units
            .iter()
            .filter(|u| u.status == WorkStatus::Finalized && !included.contains(&u.id))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            block_count: self.blocks.len() as u64,
            work_unit_count: self.work_units.len() as u64,
            validation_count: self.validations.len() as u64,
            ..LedgerStats::default()
        };
        for unit in &self.work_units {
            match unit.status {
                WorkStatus::Pending => stats.pending += 1,
                WorkStatus::UnderReview => stats.under_review += 1,
                WorkStatus::Approved => stats.approved += 1,
                WorkStatus::Rejected => stats.rejected += 1,
                WorkStatus::Finalized => stats.finalized += 1,
            }
        }
        for block in &self.blocks {
            stats.total_scientific_value += block.total_scientific_value;
            stats.total_energy_consumed += block.energy_consumed;
            stats.knowledge_created += block.knowledge_created;
        }
        stats
    }
}

/// Aggregate network statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub block_count: u64,
    pub work_unit_count: u64,
    pub validation_count: u64,
    pub pending: u64,
    pub under_review: u64,
    pub approved: u64,
    pub rejected: u64,
    pub finalized: u64,
    pub total_scientific_value: f64,
    pub total_energy_consumed: f64,
    pub knowledge_created: u64,
}

#[derive(Default)]
struct LedgerState {
    blocks: Vec<Block>,
    work_units: BTreeMap<WorkId, WorkUnit>,
    validations: Vec<Validation>,
}

/// In-memory ledger storage.
#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a snapshot without re-checking linkage.
    ///
    /// Used to load historical data (and in tests, corrupted data) that the
    /// auditor is expected to judge.
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        let state = LedgerState {
            blocks: snapshot.blocks,
            work_units: snapshot.work_units.into_iter().map(|u| (u.id, u)).collect(),
            validations: snapshot.validations,
        };
        Self {
            state: RwLock::new(state),
        }
    }
}

impl LedgerRepository for InMemoryLedger {
    fn save_work_unit(&self, unit: WorkUnit) -> Result<(), RepositoryError> {
        self.state.write().work_units.insert(unit.id, unit);
        Ok(())
    }

    fn load_work_unit(&self, id: WorkId) -> Result<Option<WorkUnit>, RepositoryError> {
        Ok(self.state.read().work_units.get(&id).cloned())
    }

    fn load_work_units(&self) -> Result<Vec<WorkUnit>, RepositoryError> {
        Ok(self.state.read().work_units.values().cloned().collect())
    }

    fn save_validation(&self, validation: Validation) -> Result<(), RepositoryError> {
        let mut state = self.state.write();
        if !state.work_units.contains_key(&validation.work_id) {
            return Err(RepositoryError::WorkNotFound(validation.work_id));
        }
        state.validations.push(validation);
        Ok(())
    }

    fn load_validations(&self) -> Result<Vec<Validation>, RepositoryError> {
        Ok(self.state.read().validations.clone())
    }

    fn append_block(&self, block: Block) -> Result<(), RepositoryError> {
        let mut state = self.state.write();
        let (expected_index, expected_prev) = match state.blocks.last() {
            Some(tip) => (tip.index + 1, tip.block_hash),
            None => (0, ZERO_HASH),
        };
        if block.index != expected_index {
            return Err(RepositoryError::IndexMismatch {
                expected: expected_index,
                actual: block.index,
            });
        }
        if block.previous_hash != expected_prev {
            return Err(RepositoryError::LinkageMismatch { index: block.index });
        }
        tracing::debug!(index = block.index, units = block.work_ids.len(), "Block appended");
        state.blocks.push(block);
        Ok(())
    }

    fn load_blocks(&self) -> Result<Vec<Block>, RepositoryError> {
        Ok(self.state.read().blocks.clone())
    }

    fn tip(&self) -> Result<Option<Block>, RepositoryError> {
        Ok(self.state.read().blocks.last().cloned())
    }

    fn snapshot(&self) -> Result<LedgerSnapshot, RepositoryError> {
        let state = self.state.read();
        Ok(LedgerSnapshot {
            blocks: state.blocks.clone(),
            work_units: state.work_units.values().cloned().collect(),
            validations: state.validations.clone(),
        })
    }
}
