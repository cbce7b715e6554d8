//! Hashing and address primitives for the sentinel daemon.
//!
//! - **SHA-256** for election scores and base58check checksums
//! - **Base58check** validation of single-signature payment addresses

pub mod address;
pub mod hash;

pub use address::{address_version, encode_address, validate_address};
pub use hash::{distance, hash_value, sha256, sha256d};
