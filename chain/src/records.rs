//! Records exchanged with the chain node.

use std::fmt;

use sentinel_types::GovHash;

/// One row of the masternode roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasternodeEntry {
    /// Collateral outpoint, `<txid>-<index>`.
    pub identity: String,
    pub enabled: bool,
}

/// A governance object as listed by the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteObject {
    pub name: String,
    pub hash: GovHash,
    pub collateral_hash: Option<GovHash>,
    pub data_hex: String,
    pub absolute_yes_count: i64,
    pub yes_count: i64,
    pub no_count: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteSignal {
    Funding,
    Valid,
}

impl fmt::Display for VoteSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Funding => "funding",
            Self::Valid => "valid",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Yes,
    No,
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "yes",
            Self::No => "no",
        })
    }
}
