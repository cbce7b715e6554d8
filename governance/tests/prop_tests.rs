use proptest::prelude::*;

use sentinel_chain::MasternodeEntry;
use sentinel_crypto::encode_address;
use sentinel_governance::election::{elect, score};
use sentinel_governance::superblock::{pack_payments, target_height};
use sentinel_governance::validator::check_proposal;
use sentinel_types::{Amount, NetworkId, Payment, Proposal, Timestamp};

fn payments(amounts: &[u64]) -> Vec<Payment> {
    amounts
        .iter()
        .map(|&raw| {
            let address = encode_address(NetworkId::Test.address_version(), &[7; 20]);
            Payment::new(address, Amount::from_raw(raw).to_string()).unwrap()
        })
        .collect()
}

proptest! {
    /// Packing never exceeds the budget, and every skipped payment would
    /// have overflowed the total accumulated before it.
    #[test]
    fn packing_respects_budget(
        amounts in prop::collection::vec(1u64..1_000_000, 0..20),
        budget in 0u64..5_000_000,
    ) {
        let candidates = payments(&amounts);
        let budget = Amount::from_raw(budget);
        let packed = pack_payments(&candidates, budget);

        let total: u64 = packed.iter().map(|p| p.amount.raw()).sum();
        prop_assert!(total <= budget.raw());

        let mut allocated = 0u64;
        let mut next = packed.iter().peekable();
        for candidate in &candidates {
            if next.peek().is_some_and(|p| p.amount == candidate.amount) {
                allocated += candidate.amount.raw();
                next.next();
            } else {
                prop_assert!(allocated + candidate.amount.raw() > budget.raw());
            }
        }
        prop_assert!(next.next().is_none());
    }

    /// Same beacon and roster always elect the same identity, regardless
    /// of roster order, and never a disabled one.
    #[test]
    fn election_is_order_independent(
        ids in prop::collection::btree_set("[0-9a-f]{8}-[0-9]", 1..12),
        disabled_mask in prop::collection::vec(any::<bool>(), 12),
        beacon in "[0-9a-f]{64}",
    ) {
        let roster: Vec<MasternodeEntry> = ids
            .iter()
            .zip(disabled_mask.iter())
            .map(|(id, off)| MasternodeEntry { identity: id.clone(), enabled: !off })
            .collect();
        let mut reversed = roster.clone();
        reversed.reverse();

        let winner = elect(&beacon, &roster);
        prop_assert_eq!(winner, elect(&beacon, &reversed));

        match winner {
            Some(w) => {
                let entry = roster.iter().find(|m| m.identity == w).unwrap();
                prop_assert!(entry.enabled);
                let best = score(w, &beacon);
                for m in roster.iter().filter(|m| m.enabled) {
                    prop_assert!(best <= score(&m.identity, &beacon));
                }
            }
            None => prop_assert!(roster.iter().all(|m| !m.enabled)),
        }
    }

    /// The target height is always the first boundary strictly above `height`.
    #[test]
    fn target_height_is_next_boundary(height in 0u64..10_000_000, cycle in 1u64..20_000) {
        let target = target_height(height, cycle);
        prop_assert_eq!(target % cycle, 0);
        prop_assert!(target > height);
        prop_assert!(target - height <= cycle);
    }

    /// Breaking any single rule of a well-formed proposal makes it invalid.
    #[test]
    fn proposal_rules_are_isolated(
        now in 1_000_000u64..2_000_000_000,
        window in 1u64..10_000_000,
        coins in 0u64..1000,
        flip in 0usize..5,
    ) {
        let budget = Amount::from_coins(1000);
        let mut proposal = Proposal {
            name: "fund-it_1".into(),
            start_epoch: now - 1,
            end_epoch: now + window,
            payment_address: encode_address(NetworkId::Test.address_version(), &[3; 20]),
            payment_amount: Amount::from_coins(coins).to_string(),
        };
        let now = Timestamp::new(now);
        prop_assert!(check_proposal(&proposal, now, budget, NetworkId::Test).is_ok());

        match flip {
            0 => proposal.name.push(' '),
            1 => proposal.end_epoch = now.as_secs(),
            2 => proposal.start_epoch = proposal.end_epoch,
            3 => proposal.payment_address.push('1'),
            _ => proposal.payment_amount = "1000.5".into(),
        }
        prop_assert!(check_proposal(&proposal, now, budget, NetworkId::Test).is_err());
    }
}
