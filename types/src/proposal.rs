//! Funding proposals.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::TypesError;

/// A single funding request with a validity window and payment terms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal name, part of the proposal's identity.
    pub name: String,
    pub start_epoch: u64,
    pub end_epoch: u64,
    pub payment_address: String,
    /// Amount exactly as it appears in the payload; parse with [`Proposal::amount`].
    pub payment_amount: String,
}

impl Proposal {
    /// The requested amount as a fixed-point value.
    pub fn amount(&self) -> Result<Amount, TypesError> {
        self.payment_amount.parse()
    }
}
