use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("governance error: {0}")]
    Governance(#[from] sentinel_governance::GovernanceError),

    #[error("store error: {0}")]
    Store(#[from] sentinel_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] sentinel_store_lmdb::LmdbError),

    #[error("chain error: {0}")]
    Chain(#[from] sentinel_chain::ChainError),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("could not detect the network from the chain node; set chain.network")]
    NetworkUndetected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
