//! The abstract Chain Port.

use sentinel_types::{GovHash, GovernanceObject};

use crate::{ChainError, MasternodeEntry, RemoteObject, VoteOutcome, VoteSignal};

/// Read and command access to the local chain node.
///
/// Replies to `prepare`, `submit` and `vote` are returned as the node's raw
/// text; callers decide whether the text is a transaction hash.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn block_count(&self) -> Result<u64, ChainError>;

    async fn block_hash(&self, height: u64) -> Result<String, ChainError>;

    /// Hash of the block at the current tip.
    async fn current_block_hash(&self) -> Result<String, ChainError> {
        let height = self.block_count().await?;
        self.block_hash(height).await
    }

    async fn masternodes(&self) -> Result<Vec<MasternodeEntry>, ChainError>;

    /// This node's masternode identity, `None` if it is not a masternode.
    async fn self_identity(&self) -> Result<Option<String>, ChainError>;

    async fn governance_objects(&self) -> Result<Vec<RemoteObject>, ChainError>;

    /// Pay the collateral for `object`. Returns the fee transaction text.
    async fn prepare(&self, object: &GovernanceObject) -> Result<String, ChainError>;

    /// Broadcast `object` once its collateral has confirmed.
    async fn submit(&self, fee_tx: &GovHash, object: &GovernanceObject) -> Result<String, ChainError>;

    async fn vote(
        &self,
        hash: &GovHash,
        signal: VoteSignal,
        outcome: VoteOutcome,
    ) -> Result<String, ChainError>;

    /// `Some(true)` on testnet, `None` if the node does not say.
    async fn is_testnet(&self) -> Result<Option<bool>, ChainError>;
}
