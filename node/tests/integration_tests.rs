//! End-to-end runs of the scheduler against a scripted chain node:
//! ingest → validation → election → superblock → outbox → auto-vote.
//!
//! These wire the same pieces `SentinelNode` wires, with the chain and the
//! clock replaced by nullables so every tick is deterministic.

use sentinel_chain::{MasternodeEntry, RemoteObject, VoteOutcome, VoteSignal};
use sentinel_crypto::encode_address;
use sentinel_governance::{GovernanceParams, Sentinel};
use sentinel_node::{report_errored_events, SchedulerConfig, Scheduler};
use sentinel_nullables::{ChainCall, NullChain, NullClock, NullStore};
use sentinel_store::{EventFilter, EventStore, GovernanceStore, ObjectFilter, Store};
use sentinel_store_lmdb::LmdbEnvironment;
use sentinel_types::codec::encode_hex;
use sentinel_types::{
    EventState, GovHash, NetworkId, ObjectStatus, ObjectType, Origin, Payload, Proposal, Validity,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START: u64 = 1_700_000_000;
const ME: &str = "aa11-0";

fn address(seed: u8) -> String {
    encode_address(NetworkId::Test.address_version(), &[seed; 20])
}

fn listed(name: &str, amount: &str, seed: u8, yes: i64) -> RemoteObject {
    let payload = Payload::Proposal(Proposal {
        name: name.to_string(),
        start_epoch: START - 3_600,
        end_epoch: START + 30 * 86_400,
        payment_address: address(seed),
        payment_amount: amount.to_string(),
    });
    RemoteObject {
        name: name.to_string(),
        hash: GovHash::new([seed; 32]),
        collateral_hash: Some(GovHash::new([0xc0 | seed; 32])),
        data_hex: encode_hex(&payload),
        absolute_yes_count: yes,
        yes_count: yes,
        no_count: 0,
    }
}

/// A chain one block before the boundary of a 24-block cycle, with this
/// node as the only enabled masternode and three proposals on the network.
fn chain(elected: bool) -> NullChain {
    let chain = NullChain::new();
    chain.set_height(23);
    chain.set_identity(Some(ME));
    let mut roster = vec![MasternodeEntry {
        identity: ME.to_string(),
        enabled: elected,
    }];
    if !elected {
        roster.push(MasternodeEntry {
            identity: "bb22-1".to_string(),
            enabled: true,
        });
    }
    chain.set_masternodes(roster);
    chain.set_objects(vec![
        listed("roads", "400", 1, 10),
        listed("schools", "700", 2, 5),
        listed("bad name!", "5", 3, 0),
    ]);
    chain
}

fn scheduler() -> Scheduler<NullClock> {
    let config = SchedulerConfig {
        loop_quantum_secs: 1,
        governance_period_secs: 30,
        election_period_secs: 0,
    };
    Scheduler::from_config(&config, NullClock::new(START))
}

fn sentinel<S: Store>(store: S, chain: NullChain) -> Sentinel<S, NullChain> {
    Sentinel::new(store, chain, GovernanceParams::default(), NetworkId::Test).unwrap()
}

fn local_superblocks<S: Store>(store: &S) -> Vec<sentinel_types::GovernanceObject> {
    let filter = ObjectFilter::new()
        .object_type(ObjectType::Trigger)
        .origin(Origin::Local);
    store
        .query_objects(&filter)
        .unwrap()
        .into_iter()
        .map(|id| store.get_object(id).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn elected_node_builds_submits_and_funds_its_superblock() {
    let s = sentinel(NullStore::new(), chain(true));
    let mut sched = scheduler();

    // Tick 1: ingest, build, vote, then prepare and submit in one pass.
    let report = sched.tick(&s).await;
    assert!(report.failed.is_empty(), "{:?}", report.failed);

    let bad = s
        .store()
        .find_by_hash(&GovHash::new([3; 32]), Origin::Remote)
        .unwrap()
        .unwrap();
    assert_eq!(s.store().get_object(bad).unwrap().status, ObjectStatus::Voted);

    let built = local_superblocks(s.store());
    assert_eq!(built.len(), 1);
    let sb = &built[0];
    let payout = sb.payload.as_superblock().unwrap();
    assert_eq!(payout.event_block_height, 24);
    // Ascending yes order: "schools" (700) fits, "roads" (400) would overflow.
    assert_eq!(payout.payment_addresses, address(2));
    assert_eq!(sb.status, ObjectStatus::Submitted);

    let fee_tx = GovHash::from_hex(&format!("{:064x}", 1)).unwrap();
    let network_hash = GovHash::from_hex(&format!("{:064x}", 2)).unwrap();
    assert_eq!(sb.fee_tx, Some(fee_tx));
    assert_eq!(sb.hash, Some(network_hash));

    let calls = s.chain().calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        ChainCall::Vote {
            hash: GovHash::new([3; 32]),
            signal: VoteSignal::Valid,
            outcome: VoteOutcome::No,
        }
    );
    assert!(matches!(&calls[1], ChainCall::Prepare { name, .. } if *name == sb.name));
    assert!(matches!(&calls[2], ChainCall::Submit { fee_tx: f, .. } if *f == fee_tx));

    let events = s.store().all_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state(), EventState::Submitted);

    // Tick 2: the network now lists our superblock; it is re-observed as a
    // REMOTE row, matches the local candidate and gets a funding vote.
    let mut objects = vec![
        listed("roads", "400", 1, 10),
        listed("schools", "700", 2, 5),
        listed("bad name!", "5", 3, 0),
    ];
    objects.push(RemoteObject {
        name: String::new(),
        hash: network_hash,
        collateral_hash: Some(fee_tx),
        data_hex: sb.data_hex.clone(),
        absolute_yes_count: 0,
        yes_count: 0,
        no_count: 0,
    });
    s.chain().set_objects(objects);

    sched.clock().advance(30);
    let report = sched.tick(&s).await;
    assert!(report.failed.is_empty(), "{:?}", report.failed);

    let remote_sb = s
        .store()
        .find_by_hash(&network_hash, Origin::Remote)
        .unwrap()
        .unwrap();
    let remote_sb = s.store().get_object(remote_sb).unwrap();
    assert_eq!(remote_sb.validity, Validity::Valid);
    assert_eq!(remote_sb.status, ObjectStatus::Voted);

    let calls = s.chain().calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(
        calls[3],
        ChainCall::Vote {
            hash: network_hash,
            signal: VoteSignal::Funding,
            outcome: VoteOutcome::Yes,
        }
    );

    // Tick 3: nothing left to do.
    sched.clock().advance(30);
    sched.tick(&s).await;
    assert_eq!(s.chain().calls().len(), 4);
    assert_eq!(local_superblocks(s.store()).len(), 1);
}

#[tokio::test]
async fn unelected_node_only_keeps_a_comparison_copy() {
    let s = sentinel(NullStore::new(), chain(false));
    let mut sched = scheduler();

    let report = sched.tick(&s).await;
    assert!(report.failed.is_empty(), "{:?}", report.failed);

    let built = local_superblocks(s.store());
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].status, ObjectStatus::New);
    assert!(s.store().all_events().is_empty());
    assert!(s
        .chain()
        .calls()
        .iter()
        .all(|call| matches!(call, ChainCall::Vote { .. })));
}

#[tokio::test]
async fn rejected_prepare_is_reported_at_startup() {
    let s = sentinel(NullStore::new(), chain(true));
    s.chain()
        .queue_prepare(Ok("Error: insufficient funds".to_string()));
    let mut sched = scheduler();

    sched.tick(&s).await;
    assert_eq!(report_errored_events(&s).unwrap(), 1);

    let errored = s.errored_events().unwrap();
    assert_eq!(errored[0].error_message, "Error: insufficient funds");

    // Errored events are never retried.
    sched.clock().advance(5);
    sched.tick(&s).await;
    let prepares = s
        .chain()
        .calls()
        .iter()
        .filter(|call| matches!(call, ChainCall::Prepare { .. }))
        .count();
    assert_eq!(prepares, 1);
}

#[tokio::test]
async fn offline_chain_fails_the_tick_without_touching_the_store() {
    let s = sentinel(NullStore::new(), chain(true));
    s.chain().set_offline(true);
    let mut sched = scheduler();

    let report = sched.tick(&s).await;
    assert_eq!(report.failed.len(), 1);
    assert!(s.store().all_objects().is_empty());

    // The governance task ran (and failed), so it waits out its period.
    s.chain().set_offline(false);
    sched.clock().advance(10);
    let report = sched.tick(&s).await;
    assert_eq!(report.ran, vec!["outbox"]);

    sched.clock().advance(20);
    sched.tick(&s).await;
    assert_eq!(s.store().all_objects().len(), 4);
}

// ---------------------------------------------------------------------------
// Durable store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lmdb_state_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).expect("open env");
        let s = sentinel(env.store(), chain(true));
        let mut sched = scheduler();
        let report = sched.tick(&s).await;
        assert!(report.failed.is_empty(), "{:?}", report.failed);
    }

    let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).expect("reopen env");
    let store = env.store();
    assert_eq!(store.query_objects(&ObjectFilter::new()).unwrap().len(), 4);
    assert_eq!(local_superblocks(&store).len(), 1);

    let events = store.query_events(&EventFilter::All).unwrap();
    assert_eq!(events.len(), 1);
    let event = store.get_event(events[0]).unwrap();
    assert_eq!(event.state(), EventState::Submitted);

    // A restarted sentinel does not build the same superblock twice.
    let s = sentinel(store, chain(true));
    let mut sched = scheduler();
    sched.tick(&s).await;
    assert_eq!(local_superblocks(s.store()).len(), 1);
}
