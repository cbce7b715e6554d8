//! Outbox events driving the two-phase delivery of local objects.
//!
//! ```text
//! PENDING ──prepare ok──▶ PREPARED ──submit ok──▶ SUBMITTED
//!    │
//!    └──prepare failed──▶ ERRORED
//! ```
//!
//! `ERRORED` and `SUBMITTED` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::object::ObjectId;
use crate::time::Timestamp;
use crate::TypesError;

/// Store-assigned row identifier of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(u64);

impl EventId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derived position of an event in the outbox state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventState {
    Pending,
    Prepared,
    Submitted,
    Errored,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Prepared => "prepared",
            Self::Submitted => "submitted",
            Self::Errored => "errored",
        }
    }
}

/// Durable outbox record for one governance object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<EventId>,
    pub governance_object_id: ObjectId,
    /// Earliest time the event may be processed.
    pub start_time: Timestamp,
    pub prepare_time: Option<Timestamp>,
    pub submit_time: Option<Timestamp>,
    pub error_time: Option<Timestamp>,
    pub error_message: String,
}

impl Event {
    pub fn new(governance_object_id: ObjectId, start_time: Timestamp) -> Self {
        Self {
            id: None,
            governance_object_id,
            start_time,
            prepare_time: None,
            submit_time: None,
            error_time: None,
            error_message: String::new(),
        }
    }

    pub fn state(&self) -> EventState {
        if self.error_time.is_some() {
            EventState::Errored
        } else if self.submit_time.is_some() {
            EventState::Submitted
        } else if self.prepare_time.is_some() {
            EventState::Prepared
        } else {
            EventState::Pending
        }
    }

    /// Whether the deferred start time has been reached.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.start_time <= now
    }

    pub fn mark_prepared(&mut self, now: Timestamp) -> Result<(), TypesError> {
        self.expect_state(EventState::Pending, "prepare")?;
        self.prepare_time = Some(now);
        Ok(())
    }

    pub fn mark_errored(&mut self, now: Timestamp, message: impl Into<String>) -> Result<(), TypesError> {
        self.expect_state(EventState::Pending, "record an error")?;
        self.error_time = Some(now);
        self.error_message = message.into();
        Ok(())
    }

    pub fn mark_submitted(&mut self, now: Timestamp) -> Result<(), TypesError> {
        self.expect_state(EventState::Prepared, "submit")?;
        self.submit_time = Some(now);
        Ok(())
    }

    fn expect_state(&self, expected: EventState, action: &'static str) -> Result<(), TypesError> {
        let state = self.state();
        if state != expected {
            return Err(TypesError::InvalidEventTransition {
                state: state.as_str(),
                action,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        Event::new(ObjectId::new(7), Timestamp::new(1_000))
    }

    #[test]
    fn new_event_is_pending() {
        let ev = event();
        assert_eq!(ev.state(), EventState::Pending);
        assert!(ev.error_message.is_empty());
    }

    #[test]
    fn happy_path_goes_through_prepared() {
        let mut ev = event();
        ev.mark_prepared(Timestamp::new(1_010)).unwrap();
        assert_eq!(ev.state(), EventState::Prepared);
        ev.mark_submitted(Timestamp::new(1_020)).unwrap();
        assert_eq!(ev.state(), EventState::Submitted);
    }

    #[test]
    fn cannot_submit_before_prepare() {
        let mut ev = event();
        assert!(ev.mark_submitted(Timestamp::new(1_010)).is_err());
        assert_eq!(ev.state(), EventState::Pending);
    }

    #[test]
    fn errored_is_terminal() {
        let mut ev = event();
        ev.mark_errored(Timestamp::new(1_010), "insufficient funds").unwrap();
        assert_eq!(ev.state(), EventState::Errored);
        assert!(ev.mark_prepared(Timestamp::new(1_020)).is_err());
        assert!(ev.mark_submitted(Timestamp::new(1_020)).is_err());
        assert_eq!(ev.error_message, "insufficient funds");
    }

    #[test]
    fn due_once_start_time_reached() {
        let ev = event();
        assert!(!ev.is_due(Timestamp::new(999)));
        assert!(ev.is_due(Timestamp::new(1_000)));
    }
}
