//! Hash types for governance objects and collateral transactions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 32-byte hash as reported by the chain node (object hash, parent hash,
/// collateral transaction id, block hash).
///
/// Displayed and parsed as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GovHash([u8; 32]);

impl GovHash {
    /// The all-zero hash, used as the parent hash of top-level objects.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a hash from node output, tolerating surrounding whitespace and quotes.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let cleaned = clean_hash(s);
        if !is_hash(cleaned) {
            return Err(TypesError::InvalidHash(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|_| TypesError::InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for GovHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GovHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for GovHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for GovHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Strip whitespace and JSON string quotes from a raw node answer.
pub fn clean_hash(s: &str) -> &str {
    s.trim().trim_matches('"').trim()
}

/// Whether a raw node answer is a well-formed 256-bit hash.
pub fn is_hash(s: &str) -> bool {
    let s = clean_hash(s);
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
