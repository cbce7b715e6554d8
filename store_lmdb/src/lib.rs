//! LMDB storage backend for the sentinel daemon.
//!
//! Implements the `sentinel-store` traits using the `heed` LMDB bindings.
//! Objects, the hash index, events and counters live in one environment,
//! and every trait call runs in its own write transaction.

pub mod environment;
pub mod error;
pub mod event;
pub mod governance;
pub mod meta;

pub use environment::{LmdbEnvironment, LmdbStore};
pub use error::LmdbError;
pub use event::LmdbEventStore;
pub use governance::LmdbGovernanceStore;
