//! # Shared Types Crate
//!
//! Domain entities and collaborator contracts shared by every ledger component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `WorkUnit`, `Validation` and `Block` are
//!   defined once here and consumed by computation, consensus, integrity and
//!   block assembly.
//! - **Tagged payloads**: work parameters, results and verification facts are
//!   sum types keyed by [`WorkType`], never open-ended maps.
//! - **Snapshot consistency**: [`InMemoryLedger`] guards all three collections
//!   with one lock so readers never observe a partially appended block.

pub mod audit;
pub mod entities;
pub mod errors;
pub mod hashing;
pub mod ledger;
pub mod ports;
pub mod work;

pub use audit::{AuditEvent, ComplianceLevel, SystemHealth};
pub use entities::*;
pub use errors::*;
pub use hashing::{block_header_hash, leading_zero_bits, merkle_root, sha256, to_hex, work_leaf_hash};
pub use ledger::{InMemoryLedger, LedgerSnapshot, LedgerStats};
pub use ports::{AuditEventSink, BlockAssembler, LedgerRepository};
pub use work::*;
