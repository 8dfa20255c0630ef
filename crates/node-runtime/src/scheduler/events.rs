use shared_types::{ComplianceLevel, SystemHealth, WorkId, WorkType};

/// Outcome of one scheduled task tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    AuditCompleted {
        integrity_score: f64,
        health: SystemHealth,
        compliance_score: f64,
        compliance: ComplianceLevel,
    },
    AuditFailed {
        reason: String,
    },
    FaultRateExceeded {
        failure_rate: f64,
        threshold: f64,
        samples: usize,
    },
    CacheEvicted {
        entries: usize,
    },
    BlockAssembled {
        index: u64,
        units: u64,
    },
    AssemblyFailed {
        reason: String,
    },
    UnitMined {
        work_id: WorkId,
        work_type: WorkType,
        difficulty: u32,
    },
    MiningFailed {
        work_type: WorkType,
        reason: String,
    },
}

impl SchedulerEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuditCompleted { .. } => "audit_completed",
            Self::AuditFailed { .. } => "audit_failed",
            Self::FaultRateExceeded { .. } => "fault_rate_exceeded",
            Self::CacheEvicted { .. } => "cache_evicted",
            Self::BlockAssembled { .. } => "block_assembled",
            Self::AssemblyFailed { .. } => "assembly_failed",
            Self::UnitMined { .. } => "unit_mined",
            Self::MiningFailed { .. } => "mining_failed",
        }
    }
}
