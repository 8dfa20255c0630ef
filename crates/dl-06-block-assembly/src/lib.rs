//! # dl-06-block-assembly
//!
//! Reference block-assembly collaborator.
//!
//! Given a batch of FINALIZED, signed work units, [`ChainAssembler`]:
//!
//! 1. rejects empty batches, duplicates and units already sealed
//! 2. computes the order-independent merkle root over `(id, signature)` leaves
//! 3. links to the current tip (`ZERO_HASH` before genesis)
//! 4. searches the smallest nonce giving `difficulty_bits` leading zero bits
//! 5. appends through the repository, which re-checks index and linkage

pub mod assembler;
pub mod metrics;
pub mod pow;

pub use assembler::{AssemblyConfig, ChainAssembler};
pub use pow::{meets_difficulty, search_nonce};
