//! Chain assembler

use crate::metrics;
use crate::pow::search_nonce;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared_types::{
    merkle_root, work_leaf_hash, AssemblyError, Block, BlockAssembler, LedgerRepository,
    WorkStatus, WorkUnit, ZERO_HASH,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Block assembly settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// Required leading zero bits of each block hash.
    pub difficulty_bits: u32,
    /// Nonces tried before giving up.
    pub max_nonce_attempts: u64,
}

impl AssemblyConfig {
    /// A hash has 256 bits; zero bits would make every block invalid.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if (1..=256).contains(&self.difficulty_bits) {
            Ok(())
        } else {
            Err(AssemblyError::InvalidDifficulty(self.difficulty_bits))
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: 8,
            max_nonce_attempts: 1 << 24,
        }
    }
}

/// [`BlockAssembler`] that appends to a [`LedgerRepository`].
///
/// Assembly is serialized so two batches never race for the same tip.
pub struct ChainAssembler<R: LedgerRepository + ?Sized> {
    repository: Arc<R>,
    config: AssemblyConfig,
    append_guard: Mutex<()>,
}

impl<R: LedgerRepository + ?Sized> ChainAssembler<R> {
    pub fn new(repository: Arc<R>, config: AssemblyConfig) -> Self {
        Self {
            repository,
            config,
            append_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    fn check_batch(&self, units: &[WorkUnit]) -> Result<(), AssemblyError> {
        if units.is_empty() {
            return Err(AssemblyError::EmptyBatch);
        }
        let sealed: HashSet<_> = self
            .repository
            .load_blocks()?
            .iter()
            .flat_map(|b| b.work_ids.iter().copied())
            .collect();

        let mut seen = HashSet::with_capacity(units.len());
        for unit in units {
            if unit.status != WorkStatus::Finalized {
                return Err(AssemblyError::NotFinalized(unit.id));
            }
            if !unit.is_signed() {
                return Err(AssemblyError::UnsignedWork(unit.id));
            }
            if !seen.insert(unit.id) {
                return Err(AssemblyError::DuplicateWork(unit.id));
            }
            if sealed.contains(&unit.id) {
                return Err(AssemblyError::AlreadySealed(unit.id));
            }
        }
        Ok(())
    }

    /// Unmined block over `units` on top of `tip`.
    fn template(
        &self,
        units: &[WorkUnit],
        tip: Option<&Block>,
        miner_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Block {
        let (index, previous_hash) = match tip {
            Some(tip) => (tip.index + 1, tip.block_hash),
            None => (0, ZERO_HASH),
        };
        let leaves: Vec<_> = units
            .iter()
            .map(|u| work_leaf_hash(u.id, u.signature.as_deref().unwrap_or_default()))
            .collect();
        let mut work_ids: Vec<_> = units.iter().map(|u| u.id).collect();
        work_ids.sort();

        Block {
            index,
            previous_hash,
            merkle_root: merkle_root(&leaves),
            difficulty: self.config.difficulty_bits,
            nonce: 0,
            block_hash: ZERO_HASH,
            miner_id: miner_id.to_string(),
            total_scientific_value: units.iter().map(|u| u.scientific_value).sum(),
            energy_consumed: units.iter().map(|u| u.energy_consumed).sum(),
            knowledge_created: units.len() as u64,
            work_ids,
            timestamp,
        }
    }
}

impl<R: LedgerRepository + ?Sized> BlockAssembler for ChainAssembler<R> {
    fn assemble(&self, units: Vec<WorkUnit>, miner_id: &str) -> Result<Block, AssemblyError> {
        self.config.validate()?;
        let _guard = self.append_guard.lock();
        self.check_batch(&units)?;

        let tip = self.repository.tip()?;
        let mut block = self.template(&units, tip.as_ref(), miner_id, Utc::now());

        let started = Instant::now();
        let difficulty = self.config.difficulty_bits;
        let attempts = self.config.max_nonce_attempts;
        let Some(nonce) = search_nonce(&block, difficulty, attempts) else {
            warn!(index = block.index, difficulty, attempts, "Nonce search exhausted");
            return Err(AssemblyError::NonceExhausted {
                difficulty,
                attempts,
            });
        };
        block.nonce = nonce;
        block.block_hash = block.compute_hash();

        self.repository.append_block(block.clone())?;

        metrics::record_block_appended(block.knowledge_created, started.elapsed().as_secs_f64());
        info!(
            index = block.index,
            nonce,
            units = block.knowledge_created,
            total_value = block.total_scientific_value,
            miner = miner_id,
            "Block assembled"
        );
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_types::{
        leading_zero_bits, InMemoryLedger, PatternResult, RepositoryError, VerificationData,
        WorkId, WorkParams, WorkResult, WorkType,
    };

    fn unit(id: u64) -> WorkUnit {
        WorkUnit {
            id: WorkId(id),
            work_type: WorkType::PrimePattern,
            difficulty: 3,
            params: WorkParams::PatternDiscovery {
                range_start: Some(103_000),
                range_end: Some(104_500),
                gap: 2,
            },
            seed: None,
            result: WorkResult::PatternDiscovery(PatternResult {
                pattern_type: "twin".into(),
                range_start: 103_000,
                range_end: 104_500,
                gap: 2,
                patterns_found: 12,
                avg_resonance: 0.5,
                largest_gap: 40,
                primes_found: 130,
                sample_pairs: vec![],
            }),
            verification: VerificationData::PatternDiscovery {
                method: "sieve_of_eratosthenes".into(),
                primes_digest: "aa".repeat(32),
                pattern_density: 700.0,
            },
            computational_cost: 2.5,
            energy_efficiency: 5000.0,
            energy_consumed: 0.25,
            precision: 15.0,
            scientific_value: 1250.0,
            worker_id: "worker".into(),
            signature: Some(format!("{id:064x}")),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            status: WorkStatus::Finalized,
        }
    }

    fn assembler() -> (ChainAssembler<InMemoryLedger>, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let config = AssemblyConfig {
            difficulty_bits: 4,
            max_nonce_attempts: 1 << 16,
        };
        (ChainAssembler::new(ledger.clone(), config), ledger)
    }

    #[test]
    fn test_genesis_and_linkage() {
        let (assembler, ledger) = assembler();
        let genesis = assembler.assemble(vec![unit(1), unit(2)], "miner-a").unwrap();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, ZERO_HASH);
        assert_eq!(genesis.knowledge_created, 2);
        assert_eq!(genesis.total_scientific_value, 2500.0);
        assert_eq!(genesis.energy_consumed, 0.5);
        assert_eq!(genesis.block_hash, genesis.compute_hash());
        assert!(leading_zero_bits(&genesis.block_hash) >= 4);

        let next = assembler.assemble(vec![unit(3)], "miner-b").unwrap();
        assert_eq!(next.index, 1);
        assert_eq!(next.previous_hash, genesis.block_hash);
        assert_eq!(ledger.load_blocks().unwrap().len(), 2);
    }

    #[test]
    fn test_merkle_root_ignores_batch_order() {
        let (a, _) = assembler();
        let (b, _) = assembler();
        let forward = a.assemble(vec![unit(1), unit(2), unit(3)], "m").unwrap();
        let reverse = b.assemble(vec![unit(3), unit(1), unit(2)], "m").unwrap();
        assert_eq!(forward.merkle_root, reverse.merkle_root);
        assert_eq!(forward.work_ids, vec![WorkId(1), WorkId(2), WorkId(3)]);
        assert_eq!(forward.work_ids, reverse.work_ids);
    }

    #[test]
    fn test_batch_rules() {
        let (assembler, ledger) = assembler();
        assert_eq!(assembler.assemble(vec![], "m").unwrap_err(), AssemblyError::EmptyBatch);

        let mut approved = unit(1);
        approved.status = WorkStatus::Approved;
        assert_eq!(
            assembler.assemble(vec![approved], "m").unwrap_err(),
            AssemblyError::NotFinalized(WorkId(1))
        );

        let mut unsigned = unit(2);
        unsigned.signature = None;
        assert_eq!(
            assembler.assemble(vec![unsigned], "m").unwrap_err(),
            AssemblyError::UnsignedWork(WorkId(2))
        );

        assert_eq!(
            assembler.assemble(vec![unit(3), unit(3)], "m").unwrap_err(),
            AssemblyError::DuplicateWork(WorkId(3))
        );

        assembler.assemble(vec![unit(4)], "m").unwrap();
        assert_eq!(
            assembler.assemble(vec![unit(4)], "m").unwrap_err(),
            AssemblyError::AlreadySealed(WorkId(4))
        );
        assert_eq!(ledger.load_blocks().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_difficulty_refused() {
        let ledger = Arc::new(InMemoryLedger::new());
        let assembler = ChainAssembler::new(
            ledger.clone(),
            AssemblyConfig {
                difficulty_bits: 0,
                max_nonce_attempts: 16,
            },
        );
        assert_eq!(
            assembler.assemble(vec![unit(1)], "m").unwrap_err(),
            AssemblyError::InvalidDifficulty(0)
        );
        assert!(ledger.tip().unwrap().is_none());
        assert!(AssemblyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_nonce_exhaustion() {
        let ledger = Arc::new(InMemoryLedger::new());
        let assembler = ChainAssembler::new(
            ledger.clone(),
            AssemblyConfig {
                difficulty_bits: 200,
                max_nonce_attempts: 16,
            },
        );
        assert_eq!(
            assembler.assemble(vec![unit(1)], "m").unwrap_err(),
            AssemblyError::NonceExhausted {
                difficulty: 200,
                attempts: 16
            }
        );
        assert!(ledger.tip().unwrap().is_none());
    }

    #[test]
    fn test_follows_external_tip() {
        let (assembler, ledger) = assembler();
        let first = assembler.assemble(vec![unit(1)], "m").unwrap();

        // A block appended behind the assembler's back moves the tip
        let mut foreign = first.clone();
        foreign.index = 1;
        foreign.previous_hash = first.block_hash;
        foreign.work_ids = vec![];
        foreign.block_hash = foreign.compute_hash();
        ledger.append_block(foreign.clone()).unwrap();

        let next = assembler.assemble(vec![unit(2)], "m").unwrap();
        assert_eq!(next.index, 2);
        assert_eq!(next.previous_hash, foreign.block_hash);

        let stale = first.clone();
        assert!(matches!(
            ledger.append_block(stale),
            Err(RepositoryError::IndexMismatch { expected: 3, actual: 0 })
        ));
    }

    #[test]
    fn test_concurrent_assembly_keeps_chain_linear() {
        let (assembler, ledger) = assembler();
        let assembler = Arc::new(assembler);
        std::thread::scope(|s| {
            for i in 0..4u64 {
                let assembler = assembler.clone();
                s.spawn(move || assembler.assemble(vec![unit(10 + i)], "m").unwrap());
            }
        });
        let blocks = ledger.load_blocks().unwrap();
        assert_eq!(blocks.len(), 4);
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].block_hash);
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
    }
}
