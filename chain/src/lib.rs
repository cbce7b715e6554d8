//! Chain Port: everything the sentinel asks of the local chain node.
//!
//! [`ChainClient`] is the abstract port; [`RpcChainClient`] speaks the
//! node's JSON-RPC interface over HTTP.

pub mod client;
pub mod error;
pub mod parse;
pub mod records;
pub mod rpc;

pub use client::ChainClient;
pub use error::ChainError;
pub use records::{MasternodeEntry, RemoteObject, VoteOutcome, VoteSignal};
pub use rpc::{RpcChainClient, RpcConfig};
