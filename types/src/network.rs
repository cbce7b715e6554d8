//! Network identifier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::TypesError;

/// Identifies which chain network the local node is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Main,
    /// The public test network.
    Test,
}

impl NetworkId {
    /// Version byte of single-signature (pay-to-pubkey-hash) addresses.
    pub fn address_version(&self) -> u8 {
        match self {
            Self::Main => 76,
            Self::Test => 140,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Test => "test",
        }
    }
}

impl FromStr for NetworkId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" | "mainnet" | "live" => Ok(Self::Main),
            "test" | "testnet" => Ok(Self::Test),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}
