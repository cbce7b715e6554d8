//! Budget-constrained superblock construction.

use sentinel_chain::ChainClient;
use sentinel_store::{ObjectFilter, ObjectOrder, Store};
use sentinel_types::{
    Amount, GovernanceObject, ObjectId, ObjectStatus, ObjectType, Origin, Payload, Payment,
    Superblock, Timestamp, Validity,
};

use crate::{GovernanceError, Sentinel};

/// What one superblock pass did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuperblockOutcome {
    /// The chain is not at the creation lead point of the cycle.
    NotDue { height: u64, blocks_left: u64 },
    /// A local superblock for this boundary already exists.
    AlreadyCreated { target_height: u64 },
    /// No proposal qualified, or none fit the budget.
    NoCandidates { target_height: u64 },
    Created {
        id: ObjectId,
        target_height: u64,
        payments: usize,
        elected: bool,
    },
}

/// Blocks from `height` up to the next cycle boundary, in `1..=cycle`.
pub fn blocks_until_boundary(height: u64, cycle: u64) -> u64 {
    cycle - height % cycle
}

/// The next cycle boundary strictly above `height`.
pub fn target_height(height: u64, cycle: u64) -> u64 {
    height + blocks_until_boundary(height, cycle)
}

/// Take candidates in order, skipping any that would overflow the budget.
///
/// A skipped candidate does not stop the scan; a smaller one later in the
/// list may still fit.
pub fn pack_payments(candidates: &[Payment], budget: Amount) -> Vec<Payment> {
    let mut allocated = Amount::ZERO;
    let mut included = Vec::new();
    for payment in candidates {
        match allocated.checked_add(payment.amount) {
            Some(next) if next <= budget => {
                allocated = next;
                included.push(payment.clone());
            }
            _ => {
                tracing::debug!(
                    address = %payment.address,
                    amount = %payment.amount,
                    %allocated,
                    "proposal does not fit the remaining budget"
                );
            }
        }
    }
    included
}

/// Node-local name of a generated superblock, `sb` plus seven digits.
fn superblock_name() -> String {
    format!("sb{}", 1_000_000 + rand::random::<u32>() % 9_000_000)
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    /// Build this cycle's superblock when the chain reaches the lead point.
    ///
    /// If this node is elected, the superblock is queued in the outbox and
    /// marked submitted; otherwise it is kept only to validate the network's
    /// superblock against.
    pub async fn build_superblock(&self, now: Timestamp) -> Result<SuperblockOutcome, GovernanceError> {
        let cycle = self.params.superblock_cycle;
        let height = self.chain.block_count().await?;
        let blocks_left = blocks_until_boundary(height, cycle);
        if blocks_left != self.params.creation_lead_blocks {
            return Ok(SuperblockOutcome::NotDue { height, blocks_left });
        }

        let target = target_height(height, cycle);
        if !self.local_superblocks(target)?.is_empty() {
            tracing::debug!(target_height = target, "superblock already created");
            return Ok(SuperblockOutcome::AlreadyCreated { target_height: target });
        }

        let candidates = self.ranked_proposals()?;
        let payments = pack_payments(&candidates, self.params.budget_allocation);
        if payments.is_empty() {
            tracing::info!(
                target_height = target,
                candidates = candidates.len(),
                "no fundable proposals, skipping superblock"
            );
            return Ok(SuperblockOutcome::NoCandidates { target_height: target });
        }

        let elected = self.is_elected().await?;

        let mut object = GovernanceObject::new(
            superblock_name(),
            Payload::Trigger(Superblock::from_payments(target, &payments)),
            Origin::Local,
            now,
        );
        object.advance_status(ObjectStatus::New)?;
        object.validity = Validity::Valid;
        let id = if elected {
            object.advance_status(ObjectStatus::Submitted)?;
            let (id, event_id) = self.store.insert_object_with_event(&object, now)?;
            tracing::info!(object_id = %id, event_id = event_id.raw(), "queued superblock for submission");
            id
        } else {
            self.store.insert_object(&object)?
        };
        tracing::info!(
            object_id = %id,
            name = %object.name,
            target_height = target,
            payments = payments.len(),
            elected,
            "created superblock"
        );

        Ok(SuperblockOutcome::Created {
            id,
            target_height: target,
            payments: payments.len(),
            elected,
        })
    }

    /// Fundable proposals in ranking order (ascending absolute yes count).
    fn ranked_proposals(&self) -> Result<Vec<Payment>, GovernanceError> {
        let filter = ObjectFilter::new()
            .object_type(ObjectType::Proposal)
            .status(ObjectStatus::New)
            .origin(Origin::Remote)
            .validity(Validity::Valid)
            .min_absolute_yes(self.params.proposal_quorum)
            .order(ObjectOrder::AbsoluteYesAscending);

        let mut payments = Vec::new();
        for id in self.store.query_objects(&filter)? {
            let object = self.store.get_object(id)?;
            let Some(proposal) = object.payload.as_proposal() else {
                continue;
            };
            match Payment::new(proposal.payment_address.as_str(), proposal.payment_amount.as_str()) {
                Ok(payment) => payments.push(payment),
                Err(e) => {
                    tracing::warn!(object_id = %id, error = %e, "skipping proposal with bad amount");
                }
            }
        }
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{proposal, sentinel, sentinel_with, test_address, NOW};
    use crate::GovernanceParams;
    use sentinel_chain::MasternodeEntry;
    use sentinel_store::{EventFilter, EventStore, GovernanceStore};

    fn pay(coins: u64) -> Payment {
        Payment::new(test_address(coins as u8), coins.to_string()).unwrap()
    }

    fn amounts(payments: &[Payment]) -> Vec<u64> {
        payments.iter().map(|p| p.amount.raw() / Amount::from_coins(1).raw()).collect()
    }

    fn remote_proposal(name: &str, amount: &str, yes: i64) -> GovernanceObject {
        let mut obj = GovernanceObject::new(
            name,
            Payload::Proposal(proposal(name, amount)),
            Origin::Remote,
            Timestamp::new(NOW),
        );
        obj.status = ObjectStatus::New;
        obj.validity = Validity::Valid;
        obj.absolute_yes_count = yes;
        obj
    }

    fn elect_self(s: &Sentinel<sentinel_nullables::NullStore, sentinel_nullables::NullChain>) {
        s.chain().set_identity(Some("m1"));
        s.chain().set_masternodes(vec![MasternodeEntry {
            identity: "m1".into(),
            enabled: true,
        }]);
    }

    #[test]
    fn target_is_the_next_boundary() {
        assert_eq!(blocks_until_boundary(23, 24), 1);
        assert_eq!(target_height(23, 24), 24);
        assert_eq!(blocks_until_boundary(24, 24), 24);
        assert_eq!(target_height(24, 24), 48);
        assert_eq!(target_height(103, 5), 105);
    }

    #[test]
    fn overflowing_item_is_skipped_and_scan_continues() {
        let candidates = [pay(40), pay(30), pay(25), pay(10)];
        let packed = pack_payments(&candidates, Amount::from_coins(90));
        assert_eq!(amounts(&packed), vec![40, 30, 10]);
    }

    #[test]
    fn packing_fills_budget_exactly() {
        let packed = pack_payments(&[pay(50), pay(50), pay(1)], Amount::from_coins(100));
        assert_eq!(amounts(&packed), vec![50, 50]);
    }

    #[test]
    fn nothing_fits_gives_empty_pack() {
        assert!(pack_payments(&[pay(5)], Amount::from_coins(4)).is_empty());
        assert!(pack_payments(&[], Amount::from_coins(4)).is_empty());
    }

    #[test]
    fn generated_names_have_seven_digits() {
        for _ in 0..50 {
            let name = superblock_name();
            assert_eq!(name.len(), 9);
            assert!(name.starts_with("sb"));
            assert!(name[2..].bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn does_nothing_outside_the_lead_window() {
        let s = sentinel();
        s.chain().set_height(10);
        s.store().insert_object(&remote_proposal("p1", "5", 1)).unwrap();
        let outcome = s.build_superblock(Timestamp::new(NOW)).await.unwrap();
        assert_eq!(outcome, SuperblockOutcome::NotDue { height: 10, blocks_left: 14 });
    }

    #[tokio::test]
    async fn empty_candidate_set_creates_nothing() {
        let s = sentinel();
        s.chain().set_height(23);
        let outcome = s.build_superblock(Timestamp::new(NOW)).await.unwrap();
        assert_eq!(outcome, SuperblockOutcome::NoCandidates { target_height: 24 });
        assert!(s.store().all_objects().is_empty());
    }

    #[tokio::test]
    async fn quorum_and_status_filter_candidates() {
        let s = sentinel_with(GovernanceParams {
            proposal_quorum: 10,
            ..Default::default()
        });
        s.chain().set_height(23);
        s.store().insert_object(&remote_proposal("weak", "5", 9)).unwrap();
        let mut voted = remote_proposal("voted", "5", 50);
        voted.status = ObjectStatus::Voted;
        s.store().insert_object(&voted).unwrap();
        let mut invalid = remote_proposal("invalid", "5", 50);
        invalid.validity = Validity::Invalid;
        s.store().insert_object(&invalid).unwrap();

        let outcome = s.build_superblock(Timestamp::new(NOW)).await.unwrap();
        assert_eq!(outcome, SuperblockOutcome::NoCandidates { target_height: 24 });
    }

    #[tokio::test]
    async fn second_pass_at_same_height_is_idempotent() {
        let s = sentinel();
        s.chain().set_height(23);
        s.store().insert_object(&remote_proposal("p1", "5", 1)).unwrap();

        let first = s.build_superblock(Timestamp::new(NOW)).await.unwrap();
        assert!(matches!(first, SuperblockOutcome::Created { target_height: 24, elected: false, .. }));
        let second = s.build_superblock(Timestamp::new(NOW + 5)).await.unwrap();
        assert_eq!(second, SuperblockOutcome::AlreadyCreated { target_height: 24 });

        let local = s
            .store()
            .query_objects(&ObjectFilter::new().origin(Origin::Local))
            .unwrap();
        assert_eq!(local.len(), 1);
    }

    #[tokio::test]
    async fn unelected_node_keeps_superblock_for_comparison() {
        let s = sentinel();
        s.chain().set_height(23);
        s.store().insert_object(&remote_proposal("p1", "5", 1)).unwrap();

        let SuperblockOutcome::Created { id, .. } = s.build_superblock(Timestamp::new(NOW)).await.unwrap() else {
            panic!("expected a superblock");
        };
        let sb = s.store().get_object(id).unwrap();
        assert_eq!(sb.origin, Origin::Local);
        assert_eq!(sb.status, ObjectStatus::New);
        assert_eq!(sb.validity, Validity::Valid);
        assert!(s.store().query_events(&EventFilter::All).unwrap().is_empty());
    }

    #[tokio::test]
    async fn elected_node_queues_superblock() {
        let s = sentinel_with(GovernanceParams {
            budget_allocation: Amount::from_coins(90),
            ..Default::default()
        });
        elect_self(&s);
        s.chain().set_height(23);
        // Inserted out of order; ranking sorts by absolute yes ascending.
        s.store().insert_object(&remote_proposal("p25", "25", 3)).unwrap();
        s.store().insert_object(&remote_proposal("p40", "40", 1)).unwrap();
        s.store().insert_object(&remote_proposal("p10", "10", 4)).unwrap();
        s.store().insert_object(&remote_proposal("p30", "30", 2)).unwrap();

        let now = Timestamp::new(NOW);
        let SuperblockOutcome::Created { id, payments, elected, .. } = s.build_superblock(now).await.unwrap() else {
            panic!("expected a superblock");
        };
        assert!(elected);
        assert_eq!(payments, 3);

        let sb = s.store().get_object(id).unwrap();
        assert_eq!(sb.status, ObjectStatus::Submitted);
        let payload = sb.payload.as_superblock().unwrap();
        assert_eq!(payload.event_block_height, 24);
        assert_eq!(payload.payment_amounts, "40|30|10");

        let events = s.store().query_events(&EventFilter::ToPrepare { now }).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(s.store().get_event(events[0]).unwrap().governance_object_id, id);
    }

    #[tokio::test]
    async fn failed_queueing_leaves_nothing_and_can_be_retried() {
        let s = sentinel();
        elect_self(&s);
        s.chain().set_height(23);
        s.store().insert_object(&remote_proposal("p1", "5", 1)).unwrap();
        s.store().set_refuse_events(true);

        let now = Timestamp::new(NOW);
        assert!(matches!(
            s.build_superblock(now).await,
            Err(GovernanceError::Store(_))
        ));
        let local = ObjectFilter::new().origin(Origin::Local);
        assert!(s.store().query_objects(&local).unwrap().is_empty());

        s.store().set_refuse_events(false);
        let outcome = s.build_superblock(now).await.unwrap();
        assert!(matches!(outcome, SuperblockOutcome::Created { elected: true, .. }));
        assert_eq!(s.store().all_events().len(), 1);
    }

    #[tokio::test]
    async fn payload_keeps_proposal_amount_text() {
        let s = sentinel();
        s.chain().set_height(23);
        s.store().insert_object(&remote_proposal("p1", "12.50", 1)).unwrap();

        let SuperblockOutcome::Created { id, .. } = s.build_superblock(Timestamp::new(NOW)).await.unwrap() else {
            panic!("expected a superblock");
        };
        let sb = s.store().get_object(id).unwrap();
        assert_eq!(sb.payload.as_superblock().unwrap().payment_amounts, "12.50");
    }
}
