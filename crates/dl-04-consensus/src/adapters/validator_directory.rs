//! Validator directory adapters

use crate::domain::EligibleSet;
use crate::ports::ValidatorDirectory;
use shared_types::ValidatorId;
use std::collections::HashMap;

/// Category of an id of the form `institution:name`, or the id itself.
fn prefix_category(validator_id: &str) -> String {
    match validator_id.split_once(':') {
        Some((institution, _)) if !institution.is_empty() => institution.to_string(),
        _ => validator_id.to_string(),
    }
}

/// Open membership: any non-empty id may vote.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenValidatorDirectory;

impl ValidatorDirectory for OpenValidatorDirectory {
    fn is_eligible(&self, validator_id: &str) -> bool {
        !validator_id.trim().is_empty()
    }

    fn category_of(&self, validator_id: &str) -> String {
        prefix_category(validator_id)
    }

    fn eligible_set(&self) -> Option<EligibleSet> {
        None
    }

    fn registered_stake(&self, _validator_id: &str) -> Option<u64> {
        None
    }
}

/// A registered validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorInfo {
    pub stake: u64,
    pub category: String,
}

/// Fixed validator set with known stake.
#[derive(Debug, Default, Clone)]
pub struct StaticValidatorDirectory {
    validators: HashMap<ValidatorId, ValidatorInfo>,
}

impl StaticValidatorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, id: &str, stake: u64, category: &str) -> Self {
        self.validators.insert(
            id.to_string(),
            ValidatorInfo {
                stake,
                category: category.to_string(),
            },
        );
        self
    }

    pub fn get(&self, id: &str) -> Option<&ValidatorInfo> {
        self.validators.get(id)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ValidatorDirectory for StaticValidatorDirectory {
    fn is_eligible(&self, validator_id: &str) -> bool {
        self.validators.contains_key(validator_id)
    }

    fn category_of(&self, validator_id: &str) -> String {
        self.validators
            .get(validator_id)
            .map(|v| v.category.clone())
            .unwrap_or_else(|| prefix_category(validator_id))
    }

    fn eligible_set(&self) -> Option<EligibleSet> {
        Some(EligibleSet {
            total_stake: self.validators.values().map(|v| v.stake).sum(),
            validators: self.validators.len(),
        })
    }

    fn registered_stake(&self, validator_id: &str) -> Option<u64> {
        self.validators.get(validator_id).map(|v| v.stake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_directory_categories() {
        let dir = OpenValidatorDirectory;
        assert!(dir.is_eligible("cern:alice"));
        assert!(!dir.is_eligible("  "));
        assert_eq!(dir.category_of("cern:alice"), "cern");
        assert_eq!(dir.category_of("bob"), "bob");
        assert_eq!(dir.category_of(":x"), ":x");
        assert!(dir.eligible_set().is_none());
        assert_eq!(dir.registered_stake("cern:alice"), None);
    }

    #[test]
    fn test_static_directory_set() {
        let dir = StaticValidatorDirectory::new()
            .with_validator("v1", 100, "mit")
            .with_validator("v2", 250, "cern");
        assert!(dir.is_eligible("v1"));
        assert!(!dir.is_eligible("v3"));
        assert_eq!(dir.category_of("v2"), "cern");
        assert_eq!(dir.registered_stake("v2"), Some(250));
        assert_eq!(dir.registered_stake("v3"), None);
        assert_eq!(
            dir.eligible_set(),
            Some(EligibleSet {
                total_stake: 350,
                validators: 2
            })
        );
    }
}
