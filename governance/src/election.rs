//! Leaderless election of the superblock originator.
//!
//! Every node sees the same block hash and the same roster, so every node
//! computes the same winner without talking to the others.

use sentinel_chain::{ChainClient, MasternodeEntry};
use sentinel_crypto::{distance, hash_value};
use sentinel_store::Store;

use crate::{GovernanceError, Sentinel};

/// `|H(identity) - H(block_hash)|` as a big-endian 256-bit integer.
pub fn score(identity: &str, block_hash: &str) -> [u8; 32] {
    distance(&hash_value(identity), &hash_value(block_hash))
}

/// The identity with the lowest score; the earliest one wins a tie.
pub fn lowest_score<'a, I>(scored: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, [u8; 32])>,
{
    let mut scored: Vec<(&str, [u8; 32])> = scored.into_iter().collect();
    scored.sort_by(|a, b| a.1.cmp(&b.1));
    scored.first().map(|(identity, _)| *identity)
}

/// The elected originator among the enabled entries of `roster`.
pub fn elect<'a>(block_hash: &str, roster: &'a [MasternodeEntry]) -> Option<&'a str> {
    lowest_score(
        roster
            .iter()
            .filter(|m| m.enabled)
            .map(|m| (m.identity.as_str(), score(&m.identity, block_hash))),
    )
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    /// Whether this node originates the current cycle's superblock.
    pub async fn is_elected(&self) -> Result<bool, GovernanceError> {
        let Some(me) = self.chain.self_identity().await? else {
            tracing::debug!("not a masternode, cannot be elected");
            return Ok(false);
        };
        let block_hash = self.chain.current_block_hash().await?;
        let roster = self.chain.masternodes().await?;

        let Some(winner) = elect(&block_hash, &roster) else {
            tracing::debug!("no enabled masternodes, nobody is elected");
            return Ok(false);
        };
        tracing::debug!(%winner, %block_hash, "election result");

        if winner == me {
            tracing::info!(identity = %me, "elected as superblock originator");
            return Ok(true);
        }
        if self.params.win_all_elections {
            tracing::warn!(identity = %me, %winner, "not elected, acting as originator by override");
            return Ok(true);
        }
        Ok(false)
    }
}
