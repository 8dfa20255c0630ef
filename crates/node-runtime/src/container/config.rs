//! # Node Configuration
//!
//! Unified configuration for every component and the scheduler.
//!
//! Each section has sane defaults and can be overridden from `DL_*`
//! environment variables. Component configs are derived from these
//! sections at the composition root.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use shared_types::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use thiserror::Error;

pub use dl_05_integrity::IntegrityConfig;
pub use dl_06_block_assembly::AssemblyConfig;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Identity used as worker id when mining and as miner id in blocks.
    pub node: NodeIdentity,
    /// Worker pool and engine limits.
    pub computation: ComputationConfig,
    /// Approval thresholds and the validator set.
    pub consensus: ConsensusConfig,
    /// Audit thresholds.
    pub integrity: IntegrityConfig,
    /// Periodic loop cadence.
    pub scheduler: SchedulerConfig,
    /// Block sealing.
    pub assembly: AssemblyConfig,
    /// Autonomous mining.
    pub mining: MiningConfig,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Cannot parse {var}={value:?}: {reason}")]
    Parse {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Node identity.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    pub node_id: String,
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self {
            node_id: "node-1".to_string(),
        }
    }
}

/// Computation configuration.
#[derive(Debug, Clone)]
pub struct ComputationConfig {
    /// Threads in the dedicated compute pool.
    pub worker_threads: usize,
    /// Jobs queued plus running.
    pub max_in_flight: usize,
    /// Per-job wait budget in milliseconds.
    pub timeout_ms: u64,
    /// Upper bound of the precomputed prime sieve.
    pub sieve_limit: u64,
    /// Seed for per-unit entropy. `None` seeds from the OS.
    pub entropy_seed: Option<u64>,
}

impl Default for ComputationConfig {
    fn default() -> Self {
        let pool = dl_01_computation::PoolConfig::default();
        Self {
            worker_threads: pool.worker_threads,
            max_in_flight: pool.max_in_flight,
            timeout_ms: pool.timeout.as_millis() as u64,
            sieve_limit: dl_01_computation::DEFAULT_SIEVE_LIMIT,
            entropy_seed: None,
        }
    }
}

impl ComputationConfig {
    pub fn pool_config(&self) -> dl_01_computation::PoolConfig {
        dl_01_computation::PoolConfig {
            worker_threads: self.worker_threads,
            max_in_flight: self.max_in_flight,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn engine_config(&self) -> dl_01_computation::EngineConfig {
        dl_01_computation::EngineConfig {
            sieve_limit: self.sieve_limit,
            ..dl_01_computation::EngineConfig::default()
        }
    }
}

/// A validator admitted to a bounded set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSpec {
    pub id: String,
    pub stake: u64,
}

impl ValidatorSpec {
    /// Institution prefix of `institution:name` ids, or the id itself.
    pub fn category(&self) -> &str {
        match self.id.split_once(':') {
            Some((institution, _)) if !institution.is_empty() => institution,
            _ => &self.id,
        }
    }
}

/// Consensus configuration.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Approving stake share needed for APPROVED.
    pub consensus_threshold: f64,
    /// Distinct voters needed for any decision.
    pub min_validators: usize,
    /// Rejecting stake share needed for an explicit REJECTED.
    pub rejection_quorum: f64,
    /// Bounded validator set. Empty means open membership.
    pub validators: Vec<ValidatorSpec>,
    /// Buffered consensus events per subscriber.
    pub event_capacity: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        let engine = dl_04_consensus::ConsensusConfig::default();
        Self {
            consensus_threshold: engine.consensus_threshold,
            min_validators: engine.min_validators,
            rejection_quorum: engine.rejection_quorum,
            validators: Vec::new(),
            event_capacity: 1024,
        }
    }
}

impl ConsensusConfig {
    pub fn engine_config(&self) -> dl_04_consensus::ConsensusConfig {
        dl_04_consensus::ConsensusConfig {
            consensus_threshold: self.consensus_threshold,
            min_validators: self.min_validators,
            rejection_quorum: self.rejection_quorum,
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub audit_interval_ms: u64,
    pub fault_check_interval_ms: u64,
    pub cache_check_interval_ms: u64,
    /// `0` disables periodic block assembly.
    pub assembly_interval_ms: u64,
    /// Computation outcomes kept by the fault monitor.
    pub fault_window: usize,
    /// Outcomes needed before a rate is reported.
    pub fault_min_samples: usize,
    /// Failure ratio above which `FaultRateExceeded` is emitted.
    pub fault_rate_threshold: f64,
    /// Memoised primality entries tolerated before eviction.
    pub max_memo_entries: usize,
    /// Capacity of the scheduler event channel.
    pub event_buffer: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            audit_interval_ms: 60_000,
            fault_check_interval_ms: 10_000,
            cache_check_interval_ms: 30_000,
            assembly_interval_ms: 0,
            fault_window: 100,
            fault_min_samples: 10,
            fault_rate_threshold: 0.25,
            max_memo_entries: 100_000,
            event_buffer: 256,
        }
    }
}

/// Autonomous miner configuration.
#[derive(Debug, Clone)]
pub struct MiningConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub min_difficulty: u32,
    pub max_difficulty: u32,
    /// Seed for work type and difficulty choice. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 5_000,
            min_difficulty: 1,
            max_difficulty: 50,
            seed: None,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `DL_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `DL_NODE_ID` | node id |
    /// | `DL_WORKER_THREADS`, `DL_MAX_IN_FLIGHT`, `DL_COMPUTE_TIMEOUT_MS`, `DL_SIEVE_LIMIT`, `DL_ENTROPY_SEED` | computation |
    /// | `DL_CONSENSUS_THRESHOLD`, `DL_MIN_VALIDATORS`, `DL_REJECTION_QUORUM` | consensus |
    /// | `DL_VALIDATORS` (`id=stake,id=stake`) | bounded validator set |
    /// | `DL_MIN_VALIDATIONS`, `DL_DEEP_VERIFICATION` | integrity |
    /// | `DL_AUDIT_INTERVAL_MS`, `DL_FAULT_CHECK_INTERVAL_MS`, `DL_CACHE_CHECK_INTERVAL_MS`, `DL_ASSEMBLY_INTERVAL_MS` | scheduler cadence |
    /// | `DL_FAULT_WINDOW`, `DL_FAULT_MIN_SAMPLES`, `DL_FAULT_RATE_THRESHOLD`, `DL_MAX_MEMO_ENTRIES` | scheduler limits |
    /// | `DL_BLOCK_DIFFICULTY_BITS`, `DL_MAX_NONCE_ATTEMPTS` | assembly |
    /// | `DL_MINING_ENABLED`, `DL_MINING_INTERVAL_MS`, `DL_MINING_MIN_DIFFICULTY`, `DL_MINING_MAX_DIFFICULTY`, `DL_MINING_SEED` | mining |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let vars = Overrides(lookup);

        if let Some(id) = vars.get("DL_NODE_ID") {
            config.node.node_id = id;
        }

        let c = &mut config.computation;
        vars.parse("DL_WORKER_THREADS", &mut c.worker_threads)?;
        vars.parse("DL_MAX_IN_FLIGHT", &mut c.max_in_flight)?;
        vars.parse("DL_COMPUTE_TIMEOUT_MS", &mut c.timeout_ms)?;
        vars.parse("DL_SIEVE_LIMIT", &mut c.sieve_limit)?;
        vars.parse_opt("DL_ENTROPY_SEED", &mut c.entropy_seed)?;

        let c = &mut config.consensus;
        vars.parse("DL_CONSENSUS_THRESHOLD", &mut c.consensus_threshold)?;
        vars.parse("DL_MIN_VALIDATORS", &mut c.min_validators)?;
        vars.parse("DL_REJECTION_QUORUM", &mut c.rejection_quorum)?;
        if let Some(list) = vars.get("DL_VALIDATORS") {
            c.validators = parse_validators(&list)?;
        }

        vars.parse("DL_MIN_VALIDATIONS", &mut config.integrity.min_validations)?;
        vars.flag("DL_DEEP_VERIFICATION", &mut config.integrity.deep_verification)?;

        let c = &mut config.scheduler;
        vars.parse("DL_AUDIT_INTERVAL_MS", &mut c.audit_interval_ms)?;
        vars.parse("DL_FAULT_CHECK_INTERVAL_MS", &mut c.fault_check_interval_ms)?;
        vars.parse("DL_CACHE_CHECK_INTERVAL_MS", &mut c.cache_check_interval_ms)?;
        vars.parse("DL_ASSEMBLY_INTERVAL_MS", &mut c.assembly_interval_ms)?;
        vars.parse("DL_FAULT_WINDOW", &mut c.fault_window)?;
        vars.parse("DL_FAULT_MIN_SAMPLES", &mut c.fault_min_samples)?;
        vars.parse("DL_FAULT_RATE_THRESHOLD", &mut c.fault_rate_threshold)?;
        vars.parse("DL_MAX_MEMO_ENTRIES", &mut c.max_memo_entries)?;

        vars.parse("DL_BLOCK_DIFFICULTY_BITS", &mut config.assembly.difficulty_bits)?;
        vars.parse("DL_MAX_NONCE_ATTEMPTS", &mut config.assembly.max_nonce_attempts)?;

        let c = &mut config.mining;
        vars.flag("DL_MINING_ENABLED", &mut c.enabled)?;
        vars.parse("DL_MINING_INTERVAL_MS", &mut c.interval_ms)?;
        vars.parse("DL_MINING_MIN_DIFFICULTY", &mut c.min_difficulty)?;
        vars.parse("DL_MINING_MAX_DIFFICULTY", &mut c.max_difficulty)?;
        vars.parse_opt("DL_MINING_SEED", &mut c.seed)?;

        Ok(config)
    }

    /// Reject inconsistent values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.node_id.trim().is_empty() {
            return Err(invalid("node_id", "must not be empty"));
        }

        let (c, s) = (&self.computation, &self.scheduler);
        for (field, value) in [
            ("worker_threads", c.worker_threads as u64),
            ("max_in_flight", c.max_in_flight as u64),
            ("timeout_ms", c.timeout_ms),
            ("min_validators", self.consensus.min_validators as u64),
            ("event_capacity", self.consensus.event_capacity as u64),
            ("min_validations", self.integrity.min_validations as u64),
            ("audit_interval_ms", s.audit_interval_ms),
            ("fault_check_interval_ms", s.fault_check_interval_ms),
            ("cache_check_interval_ms", s.cache_check_interval_ms),
            ("fault_window", s.fault_window as u64),
            ("event_buffer", s.event_buffer as u64),
            ("max_nonce_attempts", self.assembly.max_nonce_attempts),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be positive"));
            }
        }

        check_fraction("consensus_threshold", self.consensus.consensus_threshold)?;
        check_fraction("rejection_quorum", self.consensus.rejection_quorum)?;
        check_fraction("fault_rate_threshold", s.fault_rate_threshold)?;
        if let Some(v) = self.consensus.validators.iter().find(|v| v.id.trim().is_empty()) {
            return Err(invalid("validators", format!("empty id with stake {}", v.stake)));
        }
        if s.fault_min_samples > s.fault_window {
            return Err(invalid(
                "fault_min_samples",
                format!("{} exceeds window {}", s.fault_min_samples, s.fault_window),
            ));
        }
        if let Err(e) = self.assembly.validate() {
            return Err(invalid("difficulty_bits", e.to_string()));
        }

        let m = &self.mining;
        if m.enabled && m.interval_ms == 0 {
            return Err(invalid("mining.interval_ms", "must be positive"));
        }
        for (field, d) in [
            ("mining.min_difficulty", m.min_difficulty),
            ("mining.max_difficulty", m.max_difficulty),
        ] {
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d) {
                return Err(invalid(
                    field,
                    format!("{d} outside {MIN_DIFFICULTY}..={MAX_DIFFICULTY}"),
                ));
            }
        }
        if m.min_difficulty > m.max_difficulty {
            return Err(invalid("mining.min_difficulty", "exceeds max_difficulty"));
        }
        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} outside (0, 1]")))
    }
}

fn parse_value<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
        var: var.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Variable source; blank values count as unset.
struct Overrides<F>(F);

impl<F: Fn(&str) -> Option<String>> Overrides<F> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, var: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(value) = self.get(var) {
            *target = parse_value(var, &value)?;
        }
        Ok(())
    }

    fn parse_opt<T>(&self, var: &str, target: &mut Option<T>) -> Result<(), ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(value) = self.get(var) {
            *target = Some(parse_value(var, &value)?);
        }
        Ok(())
    }

    fn flag(&self, var: &str, target: &mut bool) -> Result<(), ConfigError> {
        let Some(value) = self.get(var) else {
            return Ok(());
        };
        *target = match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::Parse {
                    var: var.to_string(),
                    value,
                    reason: "expected a boolean".to_string(),
                })
            }
        };
        Ok(())
    }
}

/// Parse `id=stake,id=stake`.
fn parse_validators(list: &str) -> Result<Vec<ValidatorSpec>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, stake) = entry.rsplit_once('=').ok_or_else(|| ConfigError::Parse {
                var: "DL_VALIDATORS".to_string(),
                value: entry.to_string(),
                reason: "expected id=stake".to_string(),
            })?;
            Ok(ValidatorSpec {
                id: id.trim().to_string(),
                stake: parse_value("DL_VALIDATORS", stake)?,
            })
        })
        .collect()
}
