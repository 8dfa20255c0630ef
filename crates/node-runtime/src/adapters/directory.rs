//! Validator membership chosen by configuration

use dl_04_consensus::{
    EligibleSet, OpenValidatorDirectory, StaticValidatorDirectory, ValidatorDirectory,
};

use crate::container::ValidatorSpec;

/// Open membership, or a bounded set with known stake.
#[derive(Debug, Clone)]
pub enum NodeValidatorDirectory {
    Open(OpenValidatorDirectory),
    Bounded(StaticValidatorDirectory),
}

impl NodeValidatorDirectory {
    /// Bounded when `validators` is non-empty.
    pub fn from_specs(validators: &[ValidatorSpec]) -> Self {
        if validators.is_empty() {
            return Self::Open(OpenValidatorDirectory);
        }
        let directory = validators
            .iter()
            .fold(StaticValidatorDirectory::new(), |dir, v| {
                dir.with_validator(&v.id, v.stake, v.category())
            });
        Self::Bounded(directory)
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded(_))
    }
}

impl ValidatorDirectory for NodeValidatorDirectory {
    fn is_eligible(&self, validator_id: &str) -> bool {
        match self {
            Self::Open(d) => d.is_eligible(validator_id),
            Self::Bounded(d) => d.is_eligible(validator_id),
        }
    }

    fn category_of(&self, validator_id: &str) -> String {
        match self {
            Self::Open(d) => d.category_of(validator_id),
            Self::Bounded(d) => d.category_of(validator_id),
        }
    }

    fn eligible_set(&self) -> Option<EligibleSet> {
        match self {
            Self::Open(d) => d.eligible_set(),
            Self::Bounded(d) => d.eligible_set(),
        }
    }

    fn registered_stake(&self, validator_id: &str) -> Option<u64> {
        match self {
            Self::Open(d) => d.registered_stake(validator_id),
            Self::Bounded(d) => d.registered_stake(validator_id),
        }
    }
}
