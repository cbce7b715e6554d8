//! Nullable infrastructure for deterministic testing.
//!
//! The clock, the chain node and the store are all reached through traits.
//! This crate provides in-memory implementations that return deterministic
//! values, can be scripted from tests, and never touch the filesystem or
//! network.

pub mod chain;
pub mod clock;
pub mod store;

pub use chain::{ChainCall, NullChain};
pub use clock::NullClock;
pub use store::NullStore;
