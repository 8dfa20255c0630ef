//! Stake tally and decision rules

use super::ConsensusConfig;
use shared_types::WorkStatus;
use std::collections::HashMap;

/// Bounded set of validators that may still vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleSet {
    pub total_stake: u64,
    pub validators: usize,
}

/// Running stake totals for one work unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    pub approve_stake: u64,
    pub reject_stake: u64,
    pub voters: usize,
    categories: HashMap<String, usize>,
}

impl VoteTally {
    pub fn record(&mut self, stake: u64, approve: bool, category: &str) {
        if approve {
            self.approve_stake = self.approve_stake.saturating_add(stake);
        } else {
            self.reject_stake = self.reject_stake.saturating_add(stake);
        }
        self.voters += 1;
        *self.categories.entry(category.to_string()).or_default() += 1;
    }

    pub fn total_stake(&self) -> u64 {
        self.approve_stake.saturating_add(self.reject_stake)
    }

    /// Approving stake over all voted stake; 0 when nothing is staked.
    pub fn approval_rate(&self) -> f64 {
        ratio(self.approve_stake, self.total_stake())
    }

    pub fn rejection_rate(&self) -> f64 {
        ratio(self.reject_stake, self.total_stake())
    }

    /// Distance of the approval rate from an even split, scaled to [0, 1].
    pub fn consensus_strength(&self) -> f64 {
        if self.total_stake() == 0 {
            return 0.0;
        }
        ((self.approval_rate() - 0.5).abs() * 2.0).min(1.0)
    }

    /// Normalized Shannon entropy of voter categories, damped until
    /// `min_validators` have voted.
    pub fn validator_diversity(&self, min_validators: usize) -> f64 {
        let n = self.voters;
        if n < 2 {
            return 0.0;
        }
        let total = n as f64;
        let entropy: f64 = self
            .categories
            .values()
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.ln()
            })
            .sum();
        let normalized = entropy / total.ln();
        let participation = (total / min_validators.max(1) as f64).min(1.0);
        (normalized * participation).clamp(0.0, 1.0)
    }

    /// Outcome implied by the current tally, if any.
    pub fn decide(&self, config: &ConsensusConfig, eligible: Option<EligibleSet>) -> Option<WorkStatus> {
        let quorum = self.voters >= config.min_validators;

        if quorum && self.approval_rate() >= config.consensus_threshold {
            return Some(WorkStatus::Approved);
        }
        if quorum && self.total_stake() > 0 && self.rejection_rate() >= config.rejection_quorum {
            return Some(WorkStatus::Rejected);
        }
        if let Some(set) = eligible {
            if !self.approval_reachable(config, set) {
                return Some(WorkStatus::Rejected);
            }
        }
        None
    }

    /// Whether the stake and voters still outstanding could lift the unit to
    /// APPROVED.
    fn approval_reachable(&self, config: &ConsensusConfig, set: EligibleSet) -> bool {
        let remaining_stake = set.total_stake.saturating_sub(self.total_stake());
        let remaining_voters = set.validators.saturating_sub(self.voters);
        if self.voters + remaining_voters < config.min_validators {
            return false;
        }
        let best = ratio(
            self.approve_stake.saturating_add(remaining_stake),
            self.total_stake().saturating_add(remaining_stake),
        );
        best >= config.consensus_threshold
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(votes: &[(u64, bool, &str)]) -> VoteTally {
        let mut t = VoteTally::default();
        for (stake, approve, category) in votes {
            t.record(*stake, *approve, category);
        }
        t
    }

    #[test]
    fn test_unanimous_approval() {
        let t = tally(&[(100, true, "a"), (100, true, "b"), (100, true, "c")]);
        assert_eq!(t.approval_rate(), 1.0);
        assert_eq!(t.consensus_strength(), 1.0);
        assert_eq!(t.decide(&ConsensusConfig::default(), None), Some(WorkStatus::Approved));
    }

    #[test]
    fn test_sixty_percent_undecided() {
        let t = tally(&[(30, true, "a"), (30, true, "b"), (40, false, "c")]);
        assert!((t.approval_rate() - 0.6).abs() < 1e-12);
        assert_eq!(t.decide(&ConsensusConfig::default(), None), None);
    }

    #[test]
    fn test_approval_requires_min_validators() {
        let t = tally(&[(100, true, "a"), (100, true, "b")]);
        assert_eq!(t.decide(&ConsensusConfig::default(), None), None);
    }

    #[test]
    fn test_rejection_quorum() {
        let t = tally(&[(100, false, "a"), (100, false, "b"), (50, true, "c")]);
        assert_eq!(t.rejection_rate(), 0.8);
        assert_eq!(t.decide(&ConsensusConfig::default(), None), Some(WorkStatus::Rejected));
    }

    #[test]
    fn test_unreachable_approval_rejects_early() {
        // 100 of 300 eligible stake rejects: best case is 200/300 < 0.75
        let set = EligibleSet {
            total_stake: 300,
            validators: 3,
        };
        let t = tally(&[(100, false, "a")]);
        assert_eq!(t.decide(&ConsensusConfig::default(), Some(set)), Some(WorkStatus::Rejected));

        let reachable = tally(&[(100, true, "a")]);
        assert_eq!(reachable.decide(&ConsensusConfig::default(), Some(set)), None);
    }

    #[test]
    fn test_too_few_eligible_validators_rejects() {
        let set = EligibleSet {
            total_stake: 200,
            validators: 2,
        };
        let t = tally(&[(100, true, "a")]);
        assert_eq!(t.decide(&ConsensusConfig::default(), Some(set)), Some(WorkStatus::Rejected));
    }

    #[test]
    fn test_zero_stake_rate_is_zero() {
        let t = tally(&[(0, true, "a"), (0, true, "b"), (0, true, "c")]);
        assert_eq!(t.approval_rate(), 0.0);
        assert_eq!(t.consensus_strength(), 0.0);
        assert_eq!(t.decide(&ConsensusConfig::default(), None), None);
    }

    #[test]
    fn test_consensus_strength_scale() {
        let split = tally(&[(50, true, "a"), (50, false, "b")]);
        assert_eq!(split.consensus_strength(), 0.0);
        let leaning = tally(&[(75, true, "a"), (25, false, "b")]);
        assert!((leaning.consensus_strength() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_diversity_rewards_breadth() {
        let single = tally(&[(1, true, "mit"), (1, true, "mit"), (1, true, "mit")]);
        let spread = tally(&[(1, true, "mit"), (1, true, "cern"), (1, true, "ias")]);
        let pair = tally(&[(1, true, "mit"), (1, true, "cern")]);
        assert_eq!(single.validator_diversity(3), 0.0);
        assert!((spread.validator_diversity(3) - 1.0).abs() < 1e-12);
        assert!(pair.validator_diversity(3) < spread.validator_diversity(3));
        assert_eq!(tally(&[(1, true, "x")]).validator_diversity(3), 0.0);
    }
}
