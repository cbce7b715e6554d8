use thiserror::Error;

use sentinel_chain::ChainError;
use sentinel_store::StoreError;
use sentinel_types::{ObjectId, TypesError};

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error("governance object {0} has no network hash")]
    MissingHash(ObjectId),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),
}
