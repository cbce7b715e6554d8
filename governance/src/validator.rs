//! Proposal and superblock validation.
//!
//! Validation is a pure decision: nothing here writes to the store. The
//! caller records the verdict in the object's `validity`.

use std::fmt;

use sentinel_chain::ChainClient;
use sentinel_crypto::validate_address;
use sentinel_store::{ObjectFilter, Store};
use sentinel_types::{
    Amount, GovernanceObject, NetworkId, ObjectType, Origin, Payload, Proposal, Superblock,
    Timestamp, Validity,
};

use crate::{GovernanceError, Sentinel};

/// The first rule a proposal breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalDefect {
    /// Name is empty or has characters outside `[A-Za-z0-9_-]`.
    Name,
    /// `end_epoch` is not in the future.
    Expired,
    /// `end_epoch` does not come after `start_epoch`.
    EmptyWindow,
    /// Not a single-signature address of this network.
    Address,
    /// Amount is not a plain non-negative decimal.
    Amount,
    /// Amount is larger than the whole cycle budget.
    OverBudget,
}

impl fmt::Display for ProposalDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "invalid proposal name",
            Self::Expired => "end epoch has passed",
            Self::EmptyWindow => "end epoch is not after start epoch",
            Self::Address => "invalid payment address",
            Self::Amount => "unparseable payment amount",
            Self::OverBudget => "payment amount exceeds budget",
        })
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check a proposal against every rule, reporting the first failure.
pub fn check_proposal(
    proposal: &Proposal,
    now: Timestamp,
    budget: Amount,
    network: NetworkId,
) -> Result<(), ProposalDefect> {
    if !valid_name(&proposal.name) {
        return Err(ProposalDefect::Name);
    }
    if proposal.end_epoch <= now.as_secs() {
        return Err(ProposalDefect::Expired);
    }
    if proposal.end_epoch <= proposal.start_epoch {
        return Err(ProposalDefect::EmptyWindow);
    }
    if !validate_address(&proposal.payment_address, network) {
        return Err(ProposalDefect::Address);
    }
    let amount = proposal.amount().map_err(|_| ProposalDefect::Amount)?;
    if amount > budget {
        return Err(ProposalDefect::OverBudget);
    }
    Ok(())
}

/// Compare a superblock against this node's own candidates at its height.
///
/// No local candidate means abstain. More than one means the local data
/// is inconsistent, which counts as invalid.
pub fn compare_superblock(candidate: &Superblock, local: &[Superblock]) -> Validity {
    match local {
        [] => Validity::Undetermined,
        [own] => candidate.same_payout(own).into(),
        _ => Validity::Invalid,
    }
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    /// Decide the validity of `object` as this node sees it now.
    pub fn validate(&self, object: &GovernanceObject, now: Timestamp) -> Result<Validity, GovernanceError> {
        match &object.payload {
            Payload::Proposal(proposal) => {
                if !self.params.enable_proposal_validation {
                    return Ok(Validity::Valid);
                }
                match check_proposal(proposal, now, self.params.budget_allocation, self.network) {
                    Ok(()) => Ok(Validity::Valid),
                    Err(defect) => {
                        tracing::debug!(name = %proposal.name, %defect, "proposal is invalid");
                        Ok(Validity::Invalid)
                    }
                }
            }
            Payload::Trigger(superblock) => {
                if !self.params.enable_superblock_validation {
                    return Ok(Validity::Valid);
                }
                let local = self.local_superblocks(superblock.event_block_height)?;
                let verdict = compare_superblock(superblock, &local);
                tracing::debug!(
                    height = superblock.event_block_height,
                    local_candidates = local.len(),
                    ?verdict,
                    "compared superblock with local candidates"
                );
                Ok(verdict)
            }
        }
    }

    /// Superblocks this node built for `height`.
    pub(crate) fn local_superblocks(&self, height: u64) -> Result<Vec<Superblock>, GovernanceError> {
        let filter = ObjectFilter::new()
            .object_type(ObjectType::Trigger)
            .origin(Origin::Local)
            .event_block_height(height);
        let mut local = Vec::new();
        for id in self.store.query_objects(&filter)? {
            if let Payload::Trigger(sb) = self.store.get_object(id)?.payload {
                local.push(sb);
            }
        }
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{proposal, sentinel, sentinel_with, test_address, NOW};
    use crate::GovernanceParams;
    use sentinel_store::GovernanceStore;

    fn budget() -> Amount {
        Amount::from_coins(1000)
    }

    fn check(p: &Proposal) -> Result<(), ProposalDefect> {
        check_proposal(p, Timestamp::new(NOW), budget(), NetworkId::Test)
    }

    fn superblock(height: u64, amounts: &str) -> Superblock {
        Superblock {
            event_block_height: height,
            payment_addresses: test_address(1),
            payment_amounts: amounts.to_string(),
        }
    }

    #[test]
    fn well_formed_proposal_passes() {
        assert_eq!(check(&proposal("dash-docs_2", "10")), Ok(()));
    }

    #[test]
    fn name_with_space_is_invalid() {
        assert_eq!(check(&proposal("prop one", "10")), Err(ProposalDefect::Name));
        assert_eq!(check(&proposal("", "10")), Err(ProposalDefect::Name));
        assert_eq!(check(&proposal("café", "10")), Err(ProposalDefect::Name));
    }

    #[test]
    fn each_rule_fails_on_its_own() {
        let mut p = proposal("p", "10");
        p.end_epoch = NOW;
        assert_eq!(check(&p), Err(ProposalDefect::Expired));

        let mut p = proposal("p", "10");
        p.start_epoch = p.end_epoch;
        assert_eq!(check(&p), Err(ProposalDefect::EmptyWindow));

        let mut p = proposal("p", "10");
        p.payment_address = sentinel_crypto::encode_address(NetworkId::Main.address_version(), &[1; 20]);
        assert_eq!(check(&p), Err(ProposalDefect::Address));

        assert_eq!(check(&proposal("p", "-1")), Err(ProposalDefect::Amount));
        assert_eq!(check(&proposal("p", "ten")), Err(ProposalDefect::Amount));
        assert_eq!(check(&proposal("p", "1000.00000001")), Err(ProposalDefect::OverBudget));
        assert_eq!(check(&proposal("p", "1000")), Ok(()));
    }

    #[test]
    fn superblock_without_local_candidate_is_undetermined() {
        assert_eq!(compare_superblock(&superblock(10, "5"), &[]), Validity::Undetermined);
    }

    #[test]
    fn superblock_must_match_byte_for_byte() {
        let own = superblock(10, "5");
        assert_eq!(compare_superblock(&superblock(10, "5"), &[own.clone()]), Validity::Valid);
        assert_eq!(compare_superblock(&superblock(10, "5.0"), &[own.clone()]), Validity::Invalid);
        assert_eq!(compare_superblock(&superblock(11, "5"), &[own.clone()]), Validity::Invalid);
        assert_eq!(compare_superblock(&superblock(10, "5"), &[own.clone(), own]), Validity::Invalid);
    }

    #[test]
    fn disabled_validation_accepts_everything() {
        let s = sentinel_with(GovernanceParams {
            enable_proposal_validation: false,
            enable_superblock_validation: false,
            ..Default::default()
        });
        let now = Timestamp::new(NOW);
        let bad = GovernanceObject::new(
            "x",
            Payload::Proposal(proposal("prop one", "10")),
            Origin::Remote,
            now,
        );
        assert_eq!(s.validate(&bad, now).unwrap(), Validity::Valid);
        let sb = GovernanceObject::new("sb", Payload::Trigger(superblock(10, "5")), Origin::Remote, now);
        assert_eq!(s.validate(&sb, now).unwrap(), Validity::Valid);
    }

    #[test]
    fn remote_superblock_is_checked_against_local_row() {
        let s = sentinel();
        let now = Timestamp::new(NOW);
        let remote = GovernanceObject::new("sb1", Payload::Trigger(superblock(48, "5")), Origin::Remote, now);
        assert_eq!(s.validate(&remote, now).unwrap(), Validity::Undetermined);

        let local = GovernanceObject::new("sb2", Payload::Trigger(superblock(48, "5")), Origin::Local, now);
        s.store().insert_object(&local).unwrap();
        assert_eq!(s.validate(&remote, now).unwrap(), Validity::Valid);

        let other = GovernanceObject::new("sb3", Payload::Trigger(superblock(48, "6")), Origin::Remote, now);
        assert_eq!(s.validate(&other, now).unwrap(), Validity::Invalid);
    }
}
