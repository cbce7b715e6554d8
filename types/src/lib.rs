//! Governance object model for the sentinel daemon.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the governance envelope, proposal and superblock payloads, outbox events,
//! fixed-point amounts, hashes, timestamps and the canonical wire codec.

pub mod amount;
pub mod codec;
pub mod error;
pub mod event;
pub mod hash;
pub mod network;
pub mod object;
pub mod proposal;
pub mod superblock;
pub mod time;

pub use amount::Amount;
pub use error::{DecodeError, TypesError};
pub use event::{Event, EventId, EventState};
pub use hash::{clean_hash, is_hash, GovHash};
pub use network::NetworkId;
pub use object::{GovernanceObject, ObjectId, ObjectStatus, ObjectType, Origin, Payload, Validity};
pub use proposal::Proposal;
pub use superblock::{Payment, Superblock};
pub use time::{Clock, SystemClock, Timestamp};
