//! Superblock (trigger) payloads: the payout list for one funding cycle.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::TypesError;

/// Separator between entries of the address and amount lists.
pub const SEPARATOR: &str = "|";

/// One payout line of a superblock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub address: String,
    pub amount: Amount,
    /// The amount as the proposal wrote it; this is what goes on the wire.
    pub amount_text: String,
}

impl Payment {
    /// Parse `amount_text`, keeping the text as written.
    pub fn new(address: impl Into<String>, amount_text: impl Into<String>) -> Result<Self, TypesError> {
        let amount_text = amount_text.into();
        Ok(Self {
            address: address.into(),
            amount: amount_text.parse()?,
            amount_text,
        })
    }
}

/// A batch payout naming addresses and amounts for one cycle.
///
/// The two lists are kept in their joined wire form because superblocks
/// from different nodes are compared byte-for-byte.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Superblock {
    pub event_block_height: u64,
    pub payment_addresses: String,
    pub payment_amounts: String,
}

impl Superblock {
    /// Join an ordered payment list into the wire form.
    pub fn from_payments(event_block_height: u64, payments: &[Payment]) -> Self {
        let addresses: Vec<&str> = payments.iter().map(|p| p.address.as_str()).collect();
        let amounts: Vec<&str> = payments.iter().map(|p| p.amount_text.as_str()).collect();
        Self {
            event_block_height,
            payment_addresses: addresses.join(SEPARATOR),
            payment_amounts: amounts.join(SEPARATOR),
        }
    }

    /// Split the wire lists back into payments, pairing entries by position.
    pub fn payments(&self) -> Result<Vec<Payment>, TypesError> {
        let split = |s: &str| -> Vec<String> {
            if s.is_empty() {
                Vec::new()
            } else {
                s.split(SEPARATOR).map(str::to_string).collect()
            }
        };
        let addresses = split(&self.payment_addresses);
        let amounts = split(&self.payment_amounts);
        if addresses.len() != amounts.len() {
            return Err(TypesError::PaymentListMismatch {
                addresses: addresses.len(),
                amounts: amounts.len(),
            });
        }
        addresses
            .into_iter()
            .zip(amounts)
            .map(|(address, amount)| Payment::new(address, amount))
            .collect()
    }

    /// Whether both superblocks describe the same payout, byte for byte.
    pub fn same_payout(&self, other: &Superblock) -> bool {
        self.event_block_height == other.event_block_height
            && self.payment_addresses == other.payment_addresses
            && self.payment_amounts == other.payment_amounts
    }
}
