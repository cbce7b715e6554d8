//! Abstract persistence port for the sentinel daemon.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The governance engine depends only on the traits. Each call
//! commits before returning; there is no deferred write path.

pub mod error;
pub mod event;
pub mod governance;

pub use error::StoreError;
pub use event::{EventFilter, EventStore};
pub use governance::{GovernanceStore, ObjectFilter, ObjectOrder};

use sentinel_types::{EventId, GovernanceObject, ObjectId, Timestamp};

/// A backend holding both governance objects and outbox events.
pub trait Store: GovernanceStore + EventStore {
    /// Insert `object` together with an outbox event for it that becomes
    /// due at `start`. Either both rows are stored or neither is.
    fn insert_object_with_event(
        &self,
        object: &GovernanceObject,
        start: Timestamp,
    ) -> Result<(ObjectId, EventId), StoreError>;
}
