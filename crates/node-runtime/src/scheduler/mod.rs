//! # Scheduler
//!
//! Periodic background loops of a node:
//!
//! | Task | Cadence | Emits |
//! |------|---------|-------|
//! | audit | `audit_interval_ms` | `AuditCompleted` / `AuditFailed` |
//! | fault monitor | `fault_check_interval_ms` | `FaultRateExceeded` |
//! | cache maintenance | `cache_check_interval_ms` | `CacheEvicted` |
//! | block assembly | `assembly_interval_ms` (0 = off) | `BlockAssembled` / `AssemblyFailed` |
//! | autonomous miner | `mining.interval_ms` when enabled | `UnitMined` / `MiningFailed` |
//!
//! Every loop runs on a tokio interval that skips missed ticks and exits when
//! the shared `watch` shutdown flag flips. [`Scheduler::stop`] awaits every
//! task handle.

mod events;

pub use events::SchedulerEvent;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dl_01_computation::PrimeCache;
use ledger_telemetry::{component_span, metric_inc, FAULT_RATE, MEMO_EVICTIONS, SCHEDULER_TICKS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared_types::{WorkParams, WorkType};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn, Instrument};

use crate::container::{MiningConfig, NodeAuditor, NodeContainer, SchedulerConfig};
use crate::health::FaultMonitor;
use crate::pipeline::MiningPipeline;

/// Components the loops act on.
#[derive(Clone)]
pub struct SchedulerDependencies {
    pub pipeline: Arc<MiningPipeline>,
    pub auditor: Arc<NodeAuditor>,
    pub cache: Arc<PrimeCache>,
    pub monitor: Arc<FaultMonitor>,
    pub node_id: String,
}

impl SchedulerDependencies {
    pub fn from_container(container: &NodeContainer) -> Self {
        Self {
            pipeline: container.pipeline.clone(),
            auditor: container.auditor.clone(),
            cache: container.prime_cache(),
            monitor: container.fault_monitor.clone(),
            node_id: container.config.node.node_id.clone(),
        }
    }
}

/// Owner of the background loops.
pub struct Scheduler {
    deps: SchedulerDependencies,
    config: SchedulerConfig,
    mining: MiningConfig,
    events: mpsc::Sender<SchedulerEvent>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Scheduler and the receiving end of its event channel.
    pub fn new(
        deps: SchedulerDependencies,
        config: SchedulerConfig,
        mining: MiningConfig,
    ) -> (Self, mpsc::Receiver<SchedulerEvent>) {
        let (events, rx) = mpsc::channel(config.event_buffer.max(1));
        let (shutdown_tx, _) = watch::channel(false);
        let scheduler = Self {
            deps,
            config,
            mining,
            events,
            shutdown_tx,
            handles: Vec::new(),
        };
        (scheduler, rx)
    }

    pub fn from_container(container: &NodeContainer) -> (Self, mpsc::Receiver<SchedulerEvent>) {
        Self::new(
            SchedulerDependencies::from_container(container),
            container.config.scheduler.clone(),
            container.config.mining.clone(),
        )
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Spawn every configured loop. No-op when already running.
    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Scheduler already running");
            return;
        }
        self.shutdown_tx.send_replace(false);

        let audit = AuditTask {
            auditor: self.deps.auditor.clone(),
            events: self.events.clone(),
        };
        self.spawn("audit", self.config.audit_interval_ms, move || {
            let task = audit.clone();
            async move { task.run().await }
        });

        let faults = FaultTask {
            monitor: self.deps.monitor.clone(),
            threshold: self.config.fault_rate_threshold,
            events: self.events.clone(),
        };
        self.spawn("fault_monitor", self.config.fault_check_interval_ms, move || {
            faults.run();
            std::future::ready(())
        });

        let cache = CacheTask {
            cache: self.deps.cache.clone(),
            max_memo_entries: self.config.max_memo_entries,
            events: self.events.clone(),
        };
        self.spawn("cache_maintenance", self.config.cache_check_interval_ms, move || {
            cache.run();
            std::future::ready(())
        });

        if self.config.assembly_interval_ms > 0 {
            let assembly = AssemblyTask {
                pipeline: self.deps.pipeline.clone(),
                miner_id: self.deps.node_id.clone(),
                events: self.events.clone(),
            };
            self.spawn("assembly", self.config.assembly_interval_ms, move || {
                let task = assembly.clone();
                async move { task.run().await }
            });
        }

        if self.mining.enabled {
            let miner = Arc::new(MinerTask {
                pipeline: self.deps.pipeline.clone(),
                worker_id: self.deps.node_id.clone(),
                min_difficulty: self.mining.min_difficulty,
                max_difficulty: self.mining.max_difficulty,
                rng: parking_lot::Mutex::new(match self.mining.seed {
                    Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                    None => ChaCha8Rng::from_entropy(),
                }),
                events: self.events.clone(),
            });
            self.spawn("miner", self.mining.interval_ms, move || {
                let task = miner.clone();
                async move { task.run().await }
            });
        }

        info!(tasks = self.handles.len(), "Scheduler started");
    }

    /// Signal shutdown and wait for every loop to exit.
    pub async fn stop(&mut self) {
        self.shutdown_tx.send_replace(true);
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Scheduled task ended abnormally");
            }
        }
        info!("Scheduler stopped");
    }

    fn spawn<F, Fut>(&mut self, task: &'static str, period_ms: u64, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = Duration::from_millis(period_ms.max(1));
        let mut shutdown = self.shutdown_tx.subscribe();
        let span = component_span!("scheduled_task", task);

        let handle = tokio::spawn(
            async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // The first tick completes immediately
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            metric_inc!(SCHEDULER_TICKS, &[task]);
                            tick().await;
                        }
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
                debug!("Scheduled task stopped");
            }
            .instrument(span),
        );
        self.handles.push(handle);
    }
}

/// Deliver `event` without blocking a loop on a slow consumer.
fn emit(events: &mpsc::Sender<SchedulerEvent>, event: SchedulerEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            warn!(event = event.kind(), "Scheduler event dropped, channel full");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

#[derive(Clone)]
struct AuditTask {
    auditor: Arc<NodeAuditor>,
    events: mpsc::Sender<SchedulerEvent>,
}

impl AuditTask {
    async fn run(&self) {
        let sweep = match self.auditor.run_integrity_sweep().await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Integrity sweep failed");
                emit(&self.events, SchedulerEvent::AuditFailed { reason: e.to_string() });
                return;
            }
        };
        match self.auditor.compliance_report().await {
            Ok(compliance) => emit(
                &self.events,
                SchedulerEvent::AuditCompleted {
                    integrity_score: sweep.integrity_score,
                    health: sweep.system_health,
                    compliance_score: compliance.compliance_score,
                    compliance: compliance.level,
                },
            ),
            Err(e) => {
                warn!(error = %e, "Compliance report failed");
                emit(&self.events, SchedulerEvent::AuditFailed { reason: e.to_string() });
            }
        }
    }
}

struct FaultTask {
    monitor: Arc<FaultMonitor>,
    threshold: f64,
    events: mpsc::Sender<SchedulerEvent>,
}

impl FaultTask {
    fn run(&self) {
        let snapshot = self.monitor.snapshot();
        let Some(rate) = snapshot.failure_rate else {
            return;
        };
        FAULT_RATE.set(rate);
        if rate > self.threshold {
            warn!(
                failure_rate = rate,
                threshold = self.threshold,
                samples = snapshot.samples,
                "Computation fault rate exceeded"
            );
            emit(
                &self.events,
                SchedulerEvent::FaultRateExceeded {
                    failure_rate: rate,
                    threshold: self.threshold,
                    samples: snapshot.samples,
                },
            );
        }
    }
}

struct CacheTask {
    cache: Arc<PrimeCache>,
    max_memo_entries: usize,
    events: mpsc::Sender<SchedulerEvent>,
}

impl CacheTask {
    fn run(&self) {
        let entries = self.cache.memo_len();
        if entries <= self.max_memo_entries {
            return;
        }
        let evicted = self.cache.evict_memo();
        MEMO_EVICTIONS.inc_by(evicted as u64);
        info!(evicted, limit = self.max_memo_entries, "Primality memo evicted");
        emit(&self.events, SchedulerEvent::CacheEvicted { entries: evicted });
    }
}

#[derive(Clone)]
struct AssemblyTask {
    pipeline: Arc<MiningPipeline>,
    miner_id: String,
    events: mpsc::Sender<SchedulerEvent>,
}

impl AssemblyTask {
    async fn run(&self) {
        match self.pipeline.assemble_block(&self.miner_id).await {
            Ok(Some(block)) => emit(
                &self.events,
                SchedulerEvent::BlockAssembled {
                    index: block.index,
                    units: block.knowledge_created,
                },
            ),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Scheduled assembly failed");
                emit(&self.events, SchedulerEvent::AssemblyFailed { reason: e.to_string() });
            }
        }
    }
}

struct MinerTask {
    pipeline: Arc<MiningPipeline>,
    worker_id: String,
    min_difficulty: u32,
    max_difficulty: u32,
    rng: parking_lot::Mutex<ChaCha8Rng>,
    events: mpsc::Sender<SchedulerEvent>,
}

impl MinerTask {
    /// Work type and difficulty for the next unit.
    fn draw(&self) -> (WorkType, u32) {
        let mut rng = self.rng.lock();
        let work_type = WorkType::ALL[rng.gen_range(0..WorkType::ALL.len())];
        let difficulty = rng.gen_range(self.min_difficulty..=self.max_difficulty);
        (work_type, difficulty)
    }

    async fn run(&self) {
        let (work_type, difficulty) = self.draw();
        let mined = self
            .pipeline
            .mine(work_type, WorkParams::derived(work_type), difficulty, &self.worker_id)
            .await;
        match mined {
            Ok(unit) => emit(
                &self.events,
                SchedulerEvent::UnitMined {
                    work_id: unit.id,
                    work_type,
                    difficulty,
                },
            ),
            Err(e) => emit(
                &self.events,
                SchedulerEvent::MiningFailed {
                    work_type,
                    reason: e.to_string(),
                },
            ),
        }
    }
}
