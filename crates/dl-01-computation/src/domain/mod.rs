//! Domain layer for the computation engine
//!
//! Pure, deterministic algorithms. Nothing here touches clocks, threads or
//! ambient randomness.

pub mod cost;
pub mod entropy;
pub mod error;
pub mod invariants;
pub mod patterns;
pub mod prime_cache;
pub mod zeros;

pub use cost::{declared_cost, CostMetrics};
pub use entropy::EntropySource;
pub use error::{ComputationError, ComputationResult};
pub use invariants::{GaugeInputs, CONSTRAINT_TOLERANCE};
pub use prime_cache::{is_prime_trial, PrimeCache, DEFAULT_SIEVE_LIMIT};
