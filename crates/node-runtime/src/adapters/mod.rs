//! # Port Adapters
//!
//! Implementations of component ports that need more than one component:
//!
//! - [`SignatureVerifier`]: consensus [`WorkVerifier`](dl_04_consensus::WorkVerifier) over the signature module
//! - [`ReplayVerifier`]: auditor [`DeepVerifier`](dl_05_integrity::DeepVerifier) over signature and recomputation
//! - [`NodeValidatorDirectory`]: open or bounded membership chosen by configuration
//! - [`NodeAuditSink`]: logs audit alerts and fans them out to subscribers

mod audit_sink;
mod directory;
mod verification;

pub use audit_sink::NodeAuditSink;
pub use directory::NodeValidatorDirectory;
pub use verification::{ReplayVerifier, SignatureVerifier};
