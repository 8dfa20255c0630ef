//! # Mining Pipeline
//!
//! ```text
//! mine:            pool.submit ─→ valuate ─→ seal signature ─→ register (PENDING)
//! assemble_block:  seal APPROVED as FINALIZED ─→ unassembled FINALIZED ─→ assemble
//! ```
//!
//! Each mined unit gets a fresh seed from the node's ChaCha stream, stored
//! on the unit so auditors can recompute it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dl_01_computation::{ComputeRequest, WorkOutput, WorkerPool};
use dl_02_valuation::ValuationEngine;
use dl_04_consensus::{ConsensusApi, ConsensusError};
use ledger_telemetry::{metric_inc, record_ledger_stats, time_histogram};
use ledger_telemetry::{MINING_DURATION, MINING_FAILURES, UNITS_MINED};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared_types::{
    Block, BlockAssembler, LedgerRepository, LedgerStats, WorkId, WorkParams, WorkStatus,
    WorkType, WorkUnit,
};
use tracing::{debug, info, warn};

use crate::container::{NodeAssembler, NodeConsensus};
use crate::error::{NodeError, NodeResult};
use crate::health::FaultMonitor;

/// Compute, value, sign and register work; seal approved work into blocks.
pub struct MiningPipeline {
    pool: Arc<WorkerPool>,
    valuation: ValuationEngine,
    consensus: Arc<NodeConsensus>,
    assembler: Arc<NodeAssembler>,
    repository: Arc<dyn LedgerRepository>,
    monitor: Arc<FaultMonitor>,
    entropy: Mutex<ChaCha8Rng>,
    next_id: AtomicU64,
}

impl MiningPipeline {
    /// `entropy_seed` of `None` seeds the per-unit stream from the OS.
    pub fn new(
        pool: Arc<WorkerPool>,
        valuation: ValuationEngine,
        consensus: Arc<NodeConsensus>,
        assembler: Arc<NodeAssembler>,
        repository: Arc<dyn LedgerRepository>,
        monitor: Arc<FaultMonitor>,
        entropy_seed: Option<u64>,
    ) -> NodeResult<Self> {
        let next_id = repository
            .load_work_units()?
            .iter()
            .map(|u| u.id.0)
            .max()
            .map_or(1, |max| max + 1);
        let entropy = match entropy_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            pool,
            valuation,
            consensus,
            assembler,
            repository,
            monitor,
            entropy: Mutex::new(entropy),
            next_id: AtomicU64::new(next_id),
        })
    }

    /// Mine one unit with a freshly drawn seed.
    pub async fn mine(
        &self,
        work_type: WorkType,
        params: WorkParams,
        difficulty: u32,
        worker_id: &str,
    ) -> NodeResult<WorkUnit> {
        let seed = self.entropy.lock().gen::<u64>();
        self.mine_request(
            ComputeRequest {
                work_type,
                params,
                difficulty,
                seed: Some(seed),
            },
            worker_id,
        )
        .await
    }

    /// Mine one unit from an explicit request.
    ///
    /// The registered unit is PENDING; it needs validator votes before it
    /// can be sealed.
    pub async fn mine_request(
        &self,
        request: ComputeRequest,
        worker_id: &str,
    ) -> NodeResult<WorkUnit> {
        let _timer = time_histogram!(MINING_DURATION);
        let work_type = request.work_type;

        let output = match self.pool.submit(request).await {
            Ok(output) => {
                self.monitor.record_success();
                output
            }
            Err(e) => {
                self.monitor.record_failure();
                metric_inc!(MINING_FAILURES, &["compute"]);
                return Err(e.into());
            }
        };

        let valuation = self
            .valuation
            .valuate(work_type, &output.result, output.difficulty)
            .inspect_err(|_| metric_inc!(MINING_FAILURES, &["valuate"]))?;

        let mut unit = self.build_unit(output, valuation.total_value);
        dl_03_work_signature::seal(&mut unit, worker_id)
            .inspect_err(|_| metric_inc!(MINING_FAILURES, &["sign"]))?;

        self.consensus
            .register_work(unit.clone())
            .await
            .inspect_err(|_| metric_inc!(MINING_FAILURES, &["register"]))?;

        metric_inc!(UNITS_MINED, &[work_type.as_str()]);
        info!(
            work_id = %unit.id,
            work_type = %work_type,
            difficulty = unit.difficulty,
            scientific_value = unit.scientific_value,
            worker = worker_id,
            "Work unit mined"
        );
        Ok(unit)
    }

    fn build_unit(&self, output: WorkOutput, scientific_value: f64) -> WorkUnit {
        let id = WorkId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let now = Utc::now();
        // Stored timestamps carry millisecond precision
        let timestamp = DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        WorkUnit {
            id,
            work_type: output.work_type,
            difficulty: output.difficulty,
            params: output.params,
            seed: output.seed,
            result: output.result,
            verification: output.verification,
            computational_cost: output.cost.computational_cost,
            energy_efficiency: output.cost.energy_efficiency,
            energy_consumed: output.cost.energy_consumed,
            precision: output.precision,
            scientific_value,
            worker_id: String::new(),
            signature: None,
            timestamp,
            status: WorkStatus::Pending,
        }
    }

    /// Seal every APPROVED unit and assemble all unsealed FINALIZED units
    /// into one block.
    ///
    /// Returns `None` when there is nothing to assemble.
    pub async fn assemble_block(&self, miner_id: &str) -> NodeResult<Option<Block>> {
        let mut sealed = 0usize;
        for work_id in self.consensus.approved_work_ids() {
            match self.consensus.seal(work_id).await {
                Ok(_) => sealed += 1,
                // Decided differently since it was listed
                Err(e @ (ConsensusError::StaleWork { .. } | ConsensusError::QuorumNotReached { .. })) => {
                    debug!(%work_id, error = %e, "Skipping unit during sealing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let units = self.repository.snapshot()?.unassembled_finalized();
        if units.is_empty() {
            debug!(sealed, "Nothing to assemble");
            return Ok(None);
        }

        let assembler = self.assembler.clone();
        let miner = miner_id.to_string();
        let block = tokio::task::spawn_blocking(move || assembler.assemble(units, &miner))
            .await
            .map_err(|e| NodeError::Task(e.to_string()))?
            .inspect_err(|e| warn!(error = %e, "Block assembly failed"))?;

        info!(
            index = block.index,
            units = block.knowledge_created,
            sealed,
            total_value = block.total_scientific_value,
            "Block sealed into ledger"
        );
        self.stats()?;
        Ok(Some(block))
    }

    /// Aggregate ledger statistics, also published as gauges.
    pub fn stats(&self) -> NodeResult<LedgerStats> {
        let stats = self.repository.snapshot()?.stats();
        record_ledger_stats(&stats);
        Ok(stats)
    }
}
