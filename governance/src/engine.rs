//! The explicit context every governance component runs in.

use sentinel_chain::ChainClient;
use sentinel_store::{EventFilter, Store};
use sentinel_types::{Event, EventId, GovernanceObject, NetworkId, ObjectId, ObjectStatus, Origin, Timestamp};

use crate::{GovernanceError, GovernanceParams};

/// Store, chain client and parameters shared by the governance tasks.
///
/// There is no process-wide state: each task borrows this context and
/// every durable write goes through the store before the task returns.
pub struct Sentinel<S, C> {
    pub(crate) store: S,
    pub(crate) chain: C,
    pub(crate) params: GovernanceParams,
    pub(crate) network: NetworkId,
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    pub fn new(
        store: S,
        chain: C,
        params: GovernanceParams,
        network: NetworkId,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            store,
            chain,
            params,
            network,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    /// Store a locally authored object and queue it for delivery.
    ///
    /// The canonical payload is recomputed before storing. The outbox will
    /// not touch the event before `start_time`.
    pub fn enqueue_local_object(
        &self,
        mut object: GovernanceObject,
        now: Timestamp,
        start_time: Timestamp,
    ) -> Result<(ObjectId, EventId), GovernanceError> {
        object.origin = Origin::Local;
        object.update_object_data();
        object.validity = self.validate(&object, now)?;
        if object.status.can_advance_to(ObjectStatus::New) {
            object.advance_status(ObjectStatus::New)?;
        }

        let (object_id, event_id) = self.store.insert_object_with_event(&object, start_time)?;
        tracing::info!(
            object_id = %object_id,
            event_id = event_id.raw(),
            name = %object.name,
            start_time = start_time.as_secs(),
            "queued local governance object"
        );
        Ok((object_id, event_id))
    }

    /// Outbox events that failed terminally and need an operator.
    pub fn errored_events(&self) -> Result<Vec<Event>, GovernanceError> {
        let ids = self.store.query_events(&EventFilter::Errored)?;
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            events.push(self.store.get_event(id)?);
        }
        Ok(events)
    }
}
