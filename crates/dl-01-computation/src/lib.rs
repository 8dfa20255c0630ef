//! # dl-01-computation
//!
//! Work computation subsystem for the discovery ledger.
//!
//! ## Architecture
//!
//! ```text
//! caller ──submit()──→ [WorkerPool] ──spawn──→ rayon threads
//!                           │                       │
//!                      semaphore bound       [ComputationEngine]
//!                           │                       │
//!                      timeout ←────oneshot──── WorkOutput
//! ```
//!
//! - `domain/` holds the pure algorithms: zero finding, prime pattern
//!   discovery, gauge invariant validation, the shared [`PrimeCache`], the
//!   declared cost model and seeded parameter derivation.
//! - [`ComputationEngine`] resolves parameters and dispatches by work type.
//! - [`WorkerPool`] keeps CPU-bound work off the async executor.
//!
//! ## Determinism
//!
//! No path reads the clock or ambient randomness. Omitted parameters come
//! from a caller-supplied seed, or the request fails with `MissingEntropy`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dl_01_computation::{ComputationEngine, ComputeRequest, PoolConfig, WorkerPool};
//! use shared_types::WorkType;
//!
//! let pool = WorkerPool::new(ComputationEngine::default(), PoolConfig::default())?;
//! let output = pool
//!     .submit(ComputeRequest::derived(WorkType::PrimePattern, 25, Some(7)))
//!     .await?;
//! ```

pub mod domain;
pub mod engine;
pub mod metrics;
pub mod pool;

pub use domain::{
    is_prime_trial, ComputationError, ComputationResult, CostMetrics, PrimeCache,
    CONSTRAINT_TOLERANCE, DEFAULT_SIEVE_LIMIT,
};
pub use engine::{ComputationEngine, ComputeRequest, EngineConfig, WorkOutput};
pub use pool::{PoolConfig, WorkerPool};
