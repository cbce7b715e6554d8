//! Governance parameters supplied by configuration.

use serde::{Deserialize, Serialize};

use sentinel_types::Amount;

use crate::GovernanceError;

/// Cycle geometry, thresholds and feature switches for the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    /// Blocks between superblocks.
    pub superblock_cycle: u64,
    /// Blocks before the cycle boundary at which the superblock is built.
    pub creation_lead_blocks: u64,
    /// Minimum absolute yes votes for a proposal to be funded.
    pub proposal_quorum: i64,
    /// Total payout available per cycle.
    pub budget_allocation: Amount,
    pub enable_proposal_validation: bool,
    pub enable_superblock_validation: bool,
    /// Test override: behave as the elected originator every cycle.
    pub win_all_elections: bool,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            superblock_cycle: 24,
            creation_lead_blocks: 1,
            proposal_quorum: 0,
            budget_allocation: Amount::from_coins(1000),
            enable_proposal_validation: true,
            enable_superblock_validation: true,
            win_all_elections: false,
        }
    }
}

impl GovernanceParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.superblock_cycle == 0 {
            return Err(GovernanceError::InvalidParams(
                "superblock_cycle must be positive".into(),
            ));
        }
        if self.creation_lead_blocks == 0 || self.creation_lead_blocks > self.superblock_cycle {
            return Err(GovernanceError::InvalidParams(format!(
                "creation_lead_blocks must be within 1..={}",
                self.superblock_cycle
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GovernanceParams::default().validate().unwrap();
    }

    #[test]
    fn lead_must_fit_in_cycle() {
        let params = GovernanceParams {
            superblock_cycle: 5,
            creation_lead_blocks: 6,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        let params = GovernanceParams {
            superblock_cycle: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
