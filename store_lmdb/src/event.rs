//! LMDB implementation of EventStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use sentinel_store::{EventFilter, EventStore, StoreError};
use sentinel_types::{Event, EventId};

use crate::meta::{self, NEXT_EVENT_ID_KEY};
use crate::LmdbError;

pub struct LmdbEventStore {
    pub(crate) env: Arc<Env>,
    pub(crate) events_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEventStore {
    /// Write a new event inside `wtxn`. Nothing is committed.
    pub(crate) fn put_new(&self, wtxn: &mut RwTxn, event: &Event) -> Result<EventId, StoreError> {
        if let Some(id) = event.id {
            return Err(StoreError::Duplicate(format!("event already stored as {}", id.raw())));
        }
        let id = EventId::new(meta::next_id(&self.meta_db, wtxn, NEXT_EVENT_ID_KEY)?);
        let mut row = event.clone();
        row.id = Some(id);
        let bytes = bincode::serialize(&row).map_err(LmdbError::from)?;
        self.events_db
            .put(wtxn, &id.raw().to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(id)
    }
}

impl EventStore for LmdbEventStore {
    fn insert_event(&self, event: &Event) -> Result<EventId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = self.put_new(&mut wtxn, event)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(id)
    }

    fn update_event(&self, event: &Event) -> Result<(), StoreError> {
        let id = event.id.ok_or(StoreError::MissingId("event"))?;
        let key = id.raw().to_be_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.events_db.get(&wtxn, &key).map_err(LmdbError::from)?.is_none() {
            return Err(LmdbError::NotFound(format!("event {}", id.raw())).into());
        }
        let bytes = bincode::serialize(event).map_err(LmdbError::from)?;
        self.events_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_event(&self, id: EventId) -> Result<Event, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .events_db
            .get(&rtxn, &id.raw().to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("event {}", id.raw())))?;
        let event = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(event)
    }

    fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut ids = Vec::new();
        for entry in self.events_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            let event: Event = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if filter.matches(&event) {
                if let Some(id) = event.id {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}
