//! Outbox event storage trait.

use sentinel_types::{Event, EventId, EventState, Timestamp};

use crate::StoreError;

/// Trait for storing outbox events.
pub trait EventStore {
    /// Persist a new event and return its assigned id.
    fn insert_event(&self, event: &Event) -> Result<EventId, StoreError>;

    /// Overwrite an existing event row.
    fn update_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Load an event by id.
    fn get_event(&self, id: EventId) -> Result<Event, StoreError>;

    /// Ids of all events matching `filter`, oldest first.
    fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventId>, StoreError>;
}

/// Selects events by outbox phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    /// Not prepared, not errored, start time reached.
    ToPrepare { now: Timestamp },
    /// Prepared, not submitted, not errored, start time reached.
    ToSubmit { now: Timestamp },
    /// Terminal failures awaiting operator attention.
    Errored,
    All,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::ToPrepare { now } => event.state() == EventState::Pending && event.is_due(*now),
            Self::ToSubmit { now } => event.state() == EventState::Prepared && event.is_due(*now),
            Self::Errored => event.state() == EventState::Errored,
            Self::All => true,
        }
    }
}
