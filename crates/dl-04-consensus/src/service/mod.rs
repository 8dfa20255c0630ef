//! Consensus Service - Core business logic
//!
//! # Architecture
//! - Per-unit serialization: every registered unit owns a `Mutex<WorkEntry>`,
//!   so a threshold crossing happens under exactly one lock holder
//! - Zero-trust signature re-verification on registration
//! - Stake-weighted approval with a minimum distinct-voter quorum
//! - Votes and status changes are persisted while the unit lock is held;
//!   events are published after it is released

use crate::domain::{
    ConsensusConfig, ConsensusError, ConsensusResult, ConsensusStatus, VoteOutcome, WorkEntry,
};
use crate::events::ConsensusEvent;
use crate::metrics;
use crate::ports::{ConsensusApi, ConsensusEventPublisher, ValidatorDirectory, WorkVerifier};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use shared_types::{LedgerRepository, Validation, WorkId, WorkStatus, WorkUnit};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies for ConsensusService
pub struct ConsensusDependencies<R: ?Sized, W, D, P> {
    pub repository: Arc<R>,
    pub verifier: Arc<W>,
    pub directory: Arc<D>,
    pub publisher: Arc<P>,
    pub config: ConsensusConfig,
}

/// Consensus Service
pub struct ConsensusService<R, W, D, P>
where
    R: LedgerRepository + ?Sized,
    W: WorkVerifier,
    D: ValidatorDirectory,
    P: ConsensusEventPublisher,
{
    repository: Arc<R>,
    verifier: Arc<W>,
    directory: Arc<D>,
    publisher: Arc<P>,
    entries: RwLock<HashMap<WorkId, Arc<Mutex<WorkEntry>>>>,
    config: ConsensusConfig,
}

impl<R, W, D, P> ConsensusService<R, W, D, P>
where
    R: LedgerRepository + ?Sized,
    W: WorkVerifier,
    D: ValidatorDirectory,
    P: ConsensusEventPublisher,
{
    pub fn new(deps: ConsensusDependencies<R, W, D, P>) -> Self {
        Self {
            repository: deps.repository,
            verifier: deps.verifier,
            directory: deps.directory,
            publisher: deps.publisher,
            entries: RwLock::new(HashMap::new()),
            config: deps.config,
        }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Number of units tracked.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// APPROVED units awaiting `seal`, in id order.
    pub fn approved_work_ids(&self) -> Vec<WorkId> {
        let entries: Vec<_> = self.entries.read().values().cloned().collect();
        let mut ids: Vec<WorkId> = entries
            .iter()
            .filter_map(|e| {
                let entry = e.lock();
                (entry.status() == WorkStatus::Approved).then_some(entry.unit.id)
            })
            .collect();
        ids.sort();
        ids
    }

    /// Rebuild in-memory vote state from the repository.
    ///
    /// Units already tracked are left alone. Returns how many were loaded.
    pub fn rehydrate(&self) -> ConsensusResult<usize> {
        let units = self.repository.load_work_units()?;
        let validations = self.repository.load_validations()?;

        let mut by_work: HashMap<WorkId, Vec<Validation>> = HashMap::new();
        for v in validations {
            by_work.entry(v.work_id).or_default().push(v);
        }

        let mut entries = self.entries.write();
        let mut loaded = 0;
        for unit in units {
            if entries.contains_key(&unit.id) {
                continue;
            }
            let id = unit.id;
            let mut entry = WorkEntry::new(unit);
            for vote in by_work.remove(&id).unwrap_or_default() {
                if entry.voters.insert(vote.validator_id.clone()) {
                    let category = self.directory.category_of(&vote.validator_id);
                    entry.tally.record(vote.stake, vote.approve, &category);
                    entry.votes.push(vote);
                }
            }
            entries.insert(id, Arc::new(Mutex::new(entry)));
            loaded += 1;
        }
        info!(loaded, "Consensus state rehydrated");
        Ok(loaded)
    }

    fn entry(&self, work_id: WorkId) -> ConsensusResult<Arc<Mutex<WorkEntry>>> {
        self.entries
            .read()
            .get(&work_id)
            .cloned()
            .ok_or(ConsensusError::UnknownWork(work_id))
    }

    fn verify_signature(&self, unit: &WorkUnit) -> ConsensusResult<()> {
        if !unit.is_signed() {
            return Err(ConsensusError::UnsignedWork(unit.id));
        }
        match self.verifier.verify(unit) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ConsensusError::InvalidSignature {
                work_id: unit.id,
                reason: "digest does not match contents".to_string(),
            }),
            Err(reason) => Err(ConsensusError::InvalidSignature {
                work_id: unit.id,
                reason,
            }),
        }
    }

    fn admit(&self, unit: WorkUnit) -> ConsensusResult<ConsensusEvent> {
        let work_id = unit.id;
        if unit.status != WorkStatus::Pending {
            return Err(ConsensusError::StaleWork {
                work_id,
                status: unit.status,
            });
        }
        self.verify_signature(&unit)?;

        let event = ConsensusEvent::WorkRegistered {
            work_id,
            work_type: unit.work_type,
            scientific_value: unit.scientific_value,
        };

        let mut entries = self.entries.write();
        if entries.contains_key(&work_id) || self.repository.load_work_unit(work_id)?.is_some() {
            return Err(ConsensusError::DuplicateWork(work_id));
        }
        self.repository.save_work_unit(unit.clone())?;
        entries.insert(work_id, Arc::new(Mutex::new(WorkEntry::new(unit))));
        Ok(event)
    }

    /// Apply one vote under the unit's lock.
    fn apply_vote(
        &self,
        work_id: WorkId,
        validator_id: &str,
        stake: u64,
        approve: bool,
    ) -> ConsensusResult<(VoteOutcome, Option<ConsensusEvent>)> {
        if validator_id.trim().is_empty() {
            return Err(ConsensusError::EmptyValidator);
        }
        if !self.directory.is_eligible(validator_id) {
            return Err(ConsensusError::UnknownValidator(validator_id.to_string()));
        }
        if let Some(registered) = self.directory.registered_stake(validator_id) {
            if stake > registered {
                return Err(ConsensusError::StakeExceedsRegistration {
                    validator: validator_id.to_string(),
                    claimed: stake,
                    registered,
                });
            }
        }

        let handle = self.entry(work_id)?;
        let mut entry = handle.lock();

        let current = entry.status();
        if current.is_decided() {
            return Err(ConsensusError::StaleWork {
                work_id,
                status: current,
            });
        }
        if entry.voters.contains(validator_id) {
            return Err(ConsensusError::DuplicateVote {
                work_id,
                validator: validator_id.to_string(),
            });
        }

        let mut tally = entry.tally.clone();
        tally.record(stake, approve, &self.directory.category_of(validator_id));
        let next = tally
            .decide(&self.config, self.directory.eligible_set())
            .unwrap_or(WorkStatus::UnderReview);

        let validation = Validation {
            work_id,
            validator_id: validator_id.to_string(),
            stake,
            approve,
            submitted_at: Utc::now(),
        };
        // Status first: a failed write leaves no stored vote behind.
        let transition = (next != current).then(|| {
            let mut unit = entry.unit.clone();
            unit.status = next;
            unit
        });
        if let Some(unit) = &transition {
            self.repository.save_work_unit(unit.clone())?;
        }
        if let Err(e) = self.repository.save_validation(validation.clone()) {
            if transition.is_some() {
                if let Err(undo) = self.repository.save_work_unit(entry.unit.clone()) {
                    warn!(%work_id, error = %undo, "Could not restore status after failed vote");
                }
            }
            return Err(e.into());
        }
        if let Some(unit) = transition {
            entry.unit = unit;
        }

        entry.tally = tally;
        entry.voters.insert(validation.validator_id.clone());
        entry.votes.push(validation);

        let decided = next.is_decided();
        let outcome = VoteOutcome {
            work_id,
            status: next,
            approval_rate: entry.tally.approval_rate(),
            voters: entry.tally.voters,
            decided,
        };
        let event = decided.then(|| ConsensusEvent::WorkDecided {
            work_id,
            status: next,
            approval_rate: outcome.approval_rate,
            voters: outcome.voters,
        });
        Ok((outcome, event))
    }

    fn apply_seal(&self, work_id: WorkId) -> ConsensusResult<WorkUnit> {
        let handle = self.entry(work_id)?;
        let mut entry = handle.lock();
        match entry.status() {
            WorkStatus::Approved => {
                let mut unit = entry.unit.clone();
                unit.status = WorkStatus::Finalized;
                self.repository.save_work_unit(unit.clone())?;
                entry.unit = unit.clone();
                Ok(unit)
            }
            status @ (WorkStatus::Rejected | WorkStatus::Finalized) => {
                Err(ConsensusError::StaleWork { work_id, status })
            }
            status => Err(ConsensusError::QuorumNotReached { work_id, status }),
        }
    }

    async fn publish(&self, event: ConsensusEvent) {
        let work_id = event.work_id();
        if let Err(e) = self.publisher.publish(event).await {
            warn!(%work_id, error = %e, "Failed to publish consensus event");
        }
    }
}

#[async_trait]
impl<R, W, D, P> ConsensusApi for ConsensusService<R, W, D, P>
where
    R: LedgerRepository + ?Sized,
    W: WorkVerifier,
    D: ValidatorDirectory,
    P: ConsensusEventPublisher,
{
    async fn register_work(&self, unit: WorkUnit) -> ConsensusResult<WorkId> {
        let work_id = unit.id;
        let event = self.admit(unit).inspect_err(|e| {
            warn!(%work_id, error = %e, "Work unit refused");
        })?;
        metrics::record_unit_registered();
        info!(%work_id, "Work unit entered consensus");
        self.publish(event).await;
        Ok(work_id)
    }

    async fn submit_vote(
        &self,
        work_id: WorkId,
        validator_id: &str,
        stake: u64,
        approve: bool,
    ) -> ConsensusResult<VoteOutcome> {
        match self.apply_vote(work_id, validator_id, stake, approve) {
            Ok((outcome, event)) => {
                metrics::record_vote_accepted();
                debug!(
                    %work_id,
                    validator = validator_id,
                    stake,
                    approve,
                    approval_rate = outcome.approval_rate,
                    "Vote accepted"
                );
                if let Some(event) = event {
                    metrics::record_unit_decided(&outcome.status.to_string());
                    info!(
                        %work_id,
                        status = %outcome.status,
                        approval_rate = outcome.approval_rate,
                        voters = outcome.voters,
                        "Work unit decided"
                    );
                    self.publish(event).await;
                }
                Ok(outcome)
            }
            Err(e) => {
                metrics::record_vote_rejected(e.reason());
                debug!(%work_id, validator = validator_id, error = %e, "Vote refused");
                Err(e)
            }
        }
    }

    async fn get_consensus_status(&self, work_id: WorkId) -> ConsensusResult<ConsensusStatus> {
        let handle = self.entry(work_id)?;
        let status = handle.lock().snapshot_status(self.config.min_validators);
        Ok(status)
    }

    async fn seal(&self, work_id: WorkId) -> ConsensusResult<WorkUnit> {
        let unit = self.apply_seal(work_id)?;
        info!(%work_id, "Work unit finalized");
        self.publish(ConsensusEvent::WorkFinalized { work_id }).await;
        Ok(unit)
    }
}
