//! Nullable chain node — a scriptable stand-in for the node's RPC interface.

use std::collections::VecDeque;
use std::sync::Mutex;

use sentinel_chain::{ChainClient, ChainError, MasternodeEntry, RemoteObject, VoteOutcome, VoteSignal};
use sentinel_types::{GovHash, GovernanceObject};

/// A command the sentinel sent to the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainCall {
    Prepare { name: String, data_hex: String },
    Submit { fee_tx: GovHash, name: String },
    Vote { hash: GovHash, signal: VoteSignal, outcome: VoteOutcome },
}

/// A chain node whose state and command replies are set by the test.
///
/// Unscripted `prepare` and `submit` calls answer with fresh fake hashes;
/// unscripted votes succeed. While offline, every call fails with a
/// transport error.
pub struct NullChain {
    height: Mutex<u64>,
    block_hash: Mutex<Option<String>>,
    masternodes: Mutex<Vec<MasternodeEntry>>,
    identity: Mutex<Option<String>>,
    objects: Mutex<Vec<RemoteObject>>,
    testnet: Mutex<Option<bool>>,
    offline: Mutex<bool>,
    prepare_replies: Mutex<VecDeque<Result<String, ChainError>>>,
    submit_replies: Mutex<VecDeque<Result<String, ChainError>>>,
    vote_replies: Mutex<VecDeque<Result<String, ChainError>>>,
    calls: Mutex<Vec<ChainCall>>,
    counter: Mutex<u64>,
}

impl NullChain {
    pub fn new() -> Self {
        Self {
            height: Mutex::new(0),
            block_hash: Mutex::new(None),
            masternodes: Mutex::new(Vec::new()),
            identity: Mutex::new(None),
            objects: Mutex::new(Vec::new()),
            testnet: Mutex::new(Some(true)),
            offline: Mutex::new(false),
            prepare_replies: Mutex::new(VecDeque::new()),
            submit_replies: Mutex::new(VecDeque::new()),
            vote_replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            counter: Mutex::new(0),
        }
    }

    pub fn set_height(&self, height: u64) {
        *self.height.lock().unwrap() = height;
    }

    /// Fix the tip hash. Without this, the hash is derived from the height.
    pub fn set_block_hash(&self, hash: impl Into<String>) {
        *self.block_hash.lock().unwrap() = Some(hash.into());
    }

    pub fn set_masternodes(&self, roster: Vec<MasternodeEntry>) {
        *self.masternodes.lock().unwrap() = roster;
    }

    pub fn set_identity(&self, identity: Option<&str>) {
        *self.identity.lock().unwrap() = identity.map(str::to_string);
    }

    pub fn set_objects(&self, objects: Vec<RemoteObject>) {
        *self.objects.lock().unwrap() = objects;
    }

    pub fn set_testnet(&self, testnet: Option<bool>) {
        *self.testnet.lock().unwrap() = testnet;
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn queue_prepare(&self, reply: Result<String, ChainError>) {
        self.prepare_replies.lock().unwrap().push_back(reply);
    }

    pub fn queue_submit(&self, reply: Result<String, ChainError>) {
        self.submit_replies.lock().unwrap().push_back(reply);
    }

    pub fn queue_vote(&self, reply: Result<String, ChainError>) {
        self.vote_replies.lock().unwrap().push_back(reply);
    }

    /// Every command received so far, oldest first.
    pub fn calls(&self) -> Vec<ChainCall> {
        self.calls.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), ChainError> {
        if *self.offline.lock().unwrap() {
            return Err(ChainError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn fake_hash(&self) -> String {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        format!("{:064x}", *counter)
    }

    fn reply(&self, queue: &Mutex<VecDeque<Result<String, ChainError>>>) -> Option<Result<String, ChainError>> {
        queue.lock().unwrap().pop_front()
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainClient for NullChain {
    async fn block_count(&self) -> Result<u64, ChainError> {
        self.check_online()?;
        Ok(*self.height.lock().unwrap())
    }

    async fn block_hash(&self, height: u64) -> Result<String, ChainError> {
        self.check_online()?;
        Ok(self
            .block_hash
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("{height:064x}")))
    }

    async fn masternodes(&self) -> Result<Vec<MasternodeEntry>, ChainError> {
        self.check_online()?;
        Ok(self.masternodes.lock().unwrap().clone())
    }

    async fn self_identity(&self) -> Result<Option<String>, ChainError> {
        self.check_online()?;
        Ok(self.identity.lock().unwrap().clone())
    }

    async fn governance_objects(&self) -> Result<Vec<RemoteObject>, ChainError> {
        self.check_online()?;
        Ok(self.objects.lock().unwrap().clone())
    }

    async fn prepare(&self, object: &GovernanceObject) -> Result<String, ChainError> {
        self.check_online()?;
        self.calls.lock().unwrap().push(ChainCall::Prepare {
            name: object.name.clone(),
            data_hex: object.data_hex.clone(),
        });
        self.reply(&self.prepare_replies)
            .unwrap_or_else(|| Ok(self.fake_hash()))
    }

    async fn submit(&self, fee_tx: &GovHash, object: &GovernanceObject) -> Result<String, ChainError> {
        self.check_online()?;
        self.calls.lock().unwrap().push(ChainCall::Submit {
            fee_tx: *fee_tx,
            name: object.name.clone(),
        });
        self.reply(&self.submit_replies)
            .unwrap_or_else(|| Ok(self.fake_hash()))
    }

    async fn vote(
        &self,
        hash: &GovHash,
        signal: VoteSignal,
        outcome: VoteOutcome,
    ) -> Result<String, ChainError> {
        self.check_online()?;
        self.calls.lock().unwrap().push(ChainCall::Vote {
            hash: *hash,
            signal,
            outcome,
        });
        self.reply(&self.vote_replies)
            .unwrap_or_else(|| Ok("Voted successfully".to_string()))
    }

    async fn is_testnet(&self) -> Result<Option<bool>, ChainError> {
        self.check_online()?;
        Ok(*self.testnet.lock().unwrap())
    }
}
