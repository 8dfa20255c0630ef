//! Node lifecycle: build, start background work, shut down cleanly.

use std::sync::Arc;

use dl_04_consensus::ConsensusEvent;
use ledger_telemetry::{gather_metrics, TelemetryError};
use shared_types::AuditEvent;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::container::{NodeConfig, NodeContainer};
use crate::error::NodeResult;
use crate::scheduler::{Scheduler, SchedulerEvent};

/// A running ledger node.
pub struct NodeRuntime {
    container: Arc<NodeContainer>,
    scheduler: Scheduler,
    scheduler_events: Option<mpsc::Receiver<SchedulerEvent>>,
    shutdown_tx: watch::Sender<bool>,
    relay: Option<JoinHandle<()>>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> NodeResult<Self> {
        Ok(Self::from_container(NodeContainer::new(config)?))
    }

    pub fn from_container(container: NodeContainer) -> Self {
        let (scheduler, events) = Scheduler::from_container(&container);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            container: Arc::new(container),
            scheduler,
            scheduler_events: Some(events),
            shutdown_tx,
            relay: None,
        }
    }

    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }

    /// Start the scheduler and the event log relay.
    pub fn start(&mut self) {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Discovery Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            node_id = %config.node.node_id,
            workers = config.computation.worker_threads,
            validators = config.consensus.validators.len(),
            mining = config.mining.enabled,
            "Starting node"
        );

        if let Some(events) = self.scheduler_events.take() {
            let relay = EventRelay {
                scheduler: events,
                consensus: self.container.consensus_events.subscribe(),
                audit: self.container.audit_sink.subscribe(),
                shutdown: self.shutdown_tx.subscribe(),
            };
            self.relay = Some(tokio::spawn(relay.run()));
        }
        self.scheduler.start();
    }

    /// Stop every loop, then the relay, and log final ledger statistics.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");
        self.scheduler.stop().await;
        self.container.pool.shutdown();

        self.shutdown_tx.send_replace(true);
        if let Some(relay) = self.relay.take() {
            if let Err(e) = relay.await {
                error!(error = %e, "Event relay ended abnormally");
            }
        }

        match self.container.pipeline.stats() {
            Ok(stats) => info!(
                blocks = stats.block_count,
                work_units = stats.work_unit_count,
                finalized = stats.finalized,
                total_value = stats.total_scientific_value,
                "Final ledger statistics"
            ),
            Err(e) => warn!(error = %e, "Could not read final ledger statistics"),
        }
        info!("Shutdown complete");
    }

    /// Prometheus text exposition of node and component metrics.
    pub fn metrics_text(&self) -> Result<String, TelemetryError> {
        gather_metrics()
    }
}

/// Logs scheduler, consensus and audit events until shutdown.
struct EventRelay {
    scheduler: mpsc::Receiver<SchedulerEvent>,
    consensus: broadcast::Receiver<ConsensusEvent>,
    audit: broadcast::Receiver<AuditEvent>,
    shutdown: watch::Receiver<bool>,
}

impl EventRelay {
    async fn run(mut self) {
        let mut consensus_open = true;
        let mut audit_open = true;
        loop {
            tokio::select! {
                Some(event) = self.scheduler.recv() => log_scheduler_event(&event),
                result = self.consensus.recv(), if consensus_open => match result {
                    Ok(event) => debug!(?event, "Consensus event"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Consensus event log lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => consensus_open = false,
                },
                result = self.audit.recv(), if audit_open => match result {
                    Ok(event) => debug!(?event, "Audit alert relayed"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Audit alert log lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => audit_open = false,
                },
                _ = self.shutdown.changed() => break,
            }
        }
        debug!("Event relay stopped");
    }
}

fn log_scheduler_event(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::AuditCompleted { integrity_score, health, compliance_score, compliance } => {
            info!(integrity_score, %health, compliance_score, %compliance, "Audit completed");
        }
        SchedulerEvent::UnitMined { work_id, work_type, difficulty } => {
            debug!(%work_id, %work_type, difficulty, "Autonomous miner produced a unit");
        }
        SchedulerEvent::BlockAssembled { index, units } => {
            info!(index, units, "Scheduled assembly sealed a block");
        }
        SchedulerEvent::CacheEvicted { entries } => debug!(entries, "Primality memo cleared"),
        other => warn!(event = other.kind(), details = ?other, "Scheduler reported a problem"),
    }
}
