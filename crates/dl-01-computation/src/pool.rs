//! # Bounded Worker Pool
//!
//! Runs CPU-bound computations on a dedicated rayon pool, off the async
//! executor that serves votes and audits.
//!
//! - `worker_threads` sizes the rayon pool.
//! - `max_in_flight` bounds queued plus running jobs through a semaphore;
//!   a permit is held until the job finishes, even after its caller timed out.
//! - `timeout` bounds how long a caller waits. A timed-out job keeps running
//!   to completion but its result is discarded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Semaphore};

use crate::domain::{ComputationError, ComputationResult};
use crate::engine::{ComputationEngine, ComputeRequest, WorkOutput};
use crate::metrics;

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub worker_threads: usize,
    pub max_in_flight: usize,
    pub timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let workers = num_cpus::get().max(1);
        Self {
            worker_threads: workers,
            max_in_flight: workers * 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Async front-end over a rayon pool.
pub struct WorkerPool {
    engine: ComputationEngine,
    pool: rayon::ThreadPool,
    permits: Arc<Semaphore>,
    config: PoolConfig,
}

impl WorkerPool {
    pub fn new(engine: ComputationEngine, config: PoolConfig) -> ComputationResult<Self> {
        if config.worker_threads == 0 || config.max_in_flight == 0 {
            return Err(ComputationError::PoolInit(
                "worker_threads and max_in_flight must be positive".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("dl-compute-{i}"))
            .panic_handler(|_| tracing::error!("Computation worker panicked"))
            .build()
            .map_err(|e| ComputationError::PoolInit(e.to_string()))?;

        tracing::info!(
            workers = config.worker_threads,
            max_in_flight = config.max_in_flight,
            timeout_ms = config.timeout.as_millis() as u64,
            "Computation pool started"
        );

        Ok(Self {
            engine,
            pool,
            permits: Arc::new(Semaphore::new(config.max_in_flight)),
            config,
        })
    }

    pub fn engine(&self) -> &ComputationEngine {
        &self.engine
    }

    /// Run `request` on the pool.
    ///
    /// # Errors
    /// Engine errors are returned unchanged; additionally `Timeout`,
    /// `PoolShutdown` and `WorkerPanicked`.
    pub async fn submit(&self, request: ComputeRequest) -> ComputationResult<WorkOutput> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ComputationError::PoolShutdown)?;

        let work_type = request.work_type;
        let engine = self.engine.clone();
        let (tx, rx) = oneshot::channel();
        let started = Instant::now();

        self.pool.spawn(move || {
            let _permit = permit;
            let _ = tx.send(engine.compute(&request));
        });

        let outcome = match tokio::time::timeout(self.config.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ComputationError::WorkerPanicked),
            Err(_) => Err(ComputationError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }),
        };

        metrics::record_computation_latency(started.elapsed().as_secs_f64());
        match &outcome {
            Ok(_) => metrics::record_computation(work_type.as_str(), "ok"),
            Err(e) => {
                tracing::warn!(work_type = %work_type, error = %e, "Computation failed");
                metrics::record_computation(work_type.as_str(), "failed");
            }
        }
        outcome
    }

    /// Jobs currently queued or running.
    pub fn in_flight(&self) -> usize {
        self.config.max_in_flight - self.permits.available_permits()
    }

    /// Refuse new submissions. Running jobs complete.
    pub fn shutdown(&self) {
        self.permits.close();
        tracing::info!("Computation pool closed to new work");
    }
}
