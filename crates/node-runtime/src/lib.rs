//! # Node Runtime Library
//!
//! Composition root of a discovery-ledger node. The binary in `main.rs` is a
//! thin wrapper over [`NodeRuntime`].
//!
//! ## Structure
//!
//! - `container/` - configuration and explicit construction of every component
//! - `adapters/` - port implementations wiring components together
//! - `pipeline/` - mine (compute, value, sign, register) and assemble blocks
//! - `scheduler/` - audit, fault-rate, cache-maintenance and mining loops
//! - `health` - rolling computation fault monitor

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod error;
pub mod health;
pub mod pipeline;
pub mod runtime;
pub mod scheduler;

pub use container::{ConfigError, NodeConfig, NodeContainer};
pub use error::{NodeError, NodeResult};
pub use pipeline::MiningPipeline;
pub use runtime::NodeRuntime;
pub use scheduler::{Scheduler, SchedulerEvent};
