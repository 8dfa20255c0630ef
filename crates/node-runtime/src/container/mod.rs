//! # Component Container
//!
//! Composition root: every component is built here, in dependency order,
//! from one [`NodeConfig`]. Nothing else in the node constructs services.
//!
//! ```text
//! Phase 1: repository, computation pool
//! Phase 2: consensus (signature verifier, validator directory, events)
//! Phase 3: integrity auditor (alert sink, optional replay verifier)
//! Phase 4: block assembler
//! Phase 5: mining pipeline
//! ```

pub mod config;

use std::sync::Arc;

use dl_01_computation::{ComputationEngine, PrimeCache, WorkerPool};
use dl_02_valuation::ValuationEngine;
use dl_04_consensus::{BroadcastEventPublisher, ConsensusDependencies, ConsensusService};
use dl_05_integrity::IntegrityAuditor;
use dl_06_block_assembly::ChainAssembler;
use shared_types::{InMemoryLedger, LedgerRepository};
use tracing::{info, instrument};

use crate::adapters::{NodeAuditSink, NodeValidatorDirectory, ReplayVerifier, SignatureVerifier};
use crate::error::NodeResult;
use crate::health::FaultMonitor;
use crate::pipeline::MiningPipeline;

pub use config::{
    AssemblyConfig, ComputationConfig, ConfigError, ConsensusConfig, IntegrityConfig,
    MiningConfig, NodeConfig, NodeIdentity, SchedulerConfig, ValidatorSpec,
};

/// Consensus engine as wired in a node.
pub type NodeConsensus = ConsensusService<
    dyn LedgerRepository,
    SignatureVerifier,
    NodeValidatorDirectory,
    BroadcastEventPublisher,
>;

/// Auditor as wired in a node.
pub type NodeAuditor = IntegrityAuditor<dyn LedgerRepository, NodeAuditSink>;

/// Assembler as wired in a node.
pub type NodeAssembler = ChainAssembler<dyn LedgerRepository>;

/// Audit alerts buffered per subscriber.
const AUDIT_EVENT_CAPACITY: usize = 64;

/// Every component of a node, built and wired.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub repository: Arc<dyn LedgerRepository>,
    pub pool: Arc<WorkerPool>,
    pub consensus: Arc<NodeConsensus>,
    pub consensus_events: Arc<BroadcastEventPublisher>,
    pub auditor: Arc<NodeAuditor>,
    pub audit_sink: Arc<NodeAuditSink>,
    pub assembler: Arc<NodeAssembler>,
    pub fault_monitor: Arc<FaultMonitor>,
    pub pipeline: Arc<MiningPipeline>,
}

impl NodeContainer {
    /// Build a node over a fresh in-memory ledger.
    pub fn new(config: NodeConfig) -> NodeResult<Self> {
        Self::with_repository(config, Arc::new(InMemoryLedger::new()))
    }

    /// Build a node over `repository`, restoring consensus state from it.
    #[instrument(name = "node_init", skip_all, fields(node_id = %config.node.node_id))]
    pub fn with_repository(
        config: NodeConfig,
        repository: Arc<dyn LedgerRepository>,
    ) -> NodeResult<Self> {
        config.validate()?;

        info!("Phase 1: computation pool");
        let engine = ComputationEngine::new(config.computation.engine_config());
        let pool = Arc::new(WorkerPool::new(
            engine.clone(),
            config.computation.pool_config(),
        )?);

        info!("Phase 2: consensus");
        let directory = NodeValidatorDirectory::from_specs(&config.consensus.validators);
        let bounded = directory.is_bounded();
        let consensus_events = Arc::new(BroadcastEventPublisher::new(
            config.consensus.event_capacity,
        ));
        let consensus = Arc::new(ConsensusService::new(ConsensusDependencies {
            repository: repository.clone(),
            verifier: Arc::new(SignatureVerifier),
            directory: Arc::new(directory),
            publisher: consensus_events.clone(),
            config: config.consensus.engine_config(),
        }));
        let restored = consensus.rehydrate()?;
        info!(restored, bounded_validator_set = bounded, "Consensus ready");

        info!("Phase 3: integrity auditor");
        let audit_sink = Arc::new(NodeAuditSink::new(AUDIT_EVENT_CAPACITY));
        let mut auditor = IntegrityAuditor::new(
            repository.clone(),
            audit_sink.clone(),
            config.integrity.clone(),
        );
        if config.integrity.deep_verification {
            auditor = auditor.with_deep_verifier(Arc::new(ReplayVerifier::new(engine)));
        }
        let auditor = Arc::new(auditor);

        info!("Phase 4: block assembler");
        let assembler = Arc::new(ChainAssembler::new(
            repository.clone(),
            config.assembly.clone(),
        ));

        info!("Phase 5: mining pipeline");
        let fault_monitor = Arc::new(FaultMonitor::new(
            config.scheduler.fault_window,
            config.scheduler.fault_min_samples,
        ));
        let pipeline = Arc::new(MiningPipeline::new(
            pool.clone(),
            ValuationEngine::default(),
            consensus.clone(),
            assembler.clone(),
            repository.clone(),
            fault_monitor.clone(),
            config.computation.entropy_seed,
        )?);

        Ok(Self {
            config,
            repository,
            pool,
            consensus,
            consensus_events,
            auditor,
            audit_sink,
            assembler,
            fault_monitor,
            pipeline,
        })
    }

    /// Prime cache shared by the pool and cache maintenance.
    pub fn prime_cache(&self) -> Arc<PrimeCache> {
        self.pool.engine().cache().clone()
    }
}

/// Small, fast, fully seeded configuration for tests.
#[cfg(test)]
pub(crate) fn test_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.computation.worker_threads = 2;
    config.computation.max_in_flight = 4;
    config.computation.entropy_seed = Some(7);
    config.assembly.difficulty_bits = 4;
    config.assembly.max_nonce_attempts = 1 << 16;
    config.mining.seed = Some(11);
    config.mining.min_difficulty = 1;
    config.mining.max_difficulty = 5;
    config
}
