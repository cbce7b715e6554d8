//! Nullable store — thread-safe in-memory storage for testing.
//!
//! Mirrors the LMDB backend's rules: ids start at 1, a stored object
//! cannot be inserted twice, and `(origin, hash)` pairs are unique.

use std::collections::BTreeMap;
use std::sync::Mutex;

use sentinel_store::{EventFilter, EventStore, GovernanceStore, ObjectFilter, Store, StoreError};
use sentinel_types::{Event, EventId, GovHash, GovernanceObject, ObjectId, Origin, Timestamp};

/// An in-memory object + event store for testing.
pub struct NullStore {
    objects: Mutex<BTreeMap<ObjectId, GovernanceObject>>,
    events: Mutex<BTreeMap<EventId, Event>>,
    next_object_id: Mutex<u64>,
    next_event_id: Mutex<u64>,
    refuse_events: Mutex<bool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            events: Mutex::new(BTreeMap::new()),
            next_object_id: Mutex::new(1),
            next_event_id: Mutex::new(1),
            refuse_events: Mutex::new(false),
        }
    }

    /// Snapshot of every stored object, in id order.
    pub fn all_objects(&self) -> Vec<GovernanceObject> {
        self.objects.lock().unwrap().values().cloned().collect()
    }

    /// Snapshot of every stored event, in id order.
    pub fn all_events(&self) -> Vec<Event> {
        self.events.lock().unwrap().values().cloned().collect()
    }

    /// Make every write that creates an event fail with a backend error.
    pub fn set_refuse_events(&self, refuse: bool) {
        *self.refuse_events.lock().unwrap() = refuse;
    }

    fn check_events_accepted(&self) -> Result<(), StoreError> {
        if *self.refuse_events.lock().unwrap() {
            return Err(StoreError::Backend("event writes refused".into()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_hash_free(
    objects: &BTreeMap<ObjectId, GovernanceObject>,
    object: &GovernanceObject,
    owner: Option<ObjectId>,
) -> Result<(), StoreError> {
    match &object.hash {
        Some(hash) if hash_taken(objects, hash, object.origin, owner) => Err(StoreError::Duplicate(
            format!("{} object with hash {hash}", object.origin.as_str()),
        )),
        _ => Ok(()),
    }
}

fn hash_taken(
    objects: &BTreeMap<ObjectId, GovernanceObject>,
    hash: &GovHash,
    origin: Origin,
    except: Option<ObjectId>,
) -> bool {
    objects
        .values()
        .any(|o| o.hash.as_ref() == Some(hash) && o.origin == origin && o.id != except)
}

impl GovernanceStore for NullStore {
    fn insert_object(&self, object: &GovernanceObject) -> Result<ObjectId, StoreError> {
        if let Some(id) = object.id {
            return Err(StoreError::Duplicate(format!("object already stored as {id}")));
        }
        let mut objects = self.objects.lock().unwrap();
        check_hash_free(&objects, object, None)?;
        let mut next = self.next_object_id.lock().unwrap();
        let id = ObjectId::new(*next);
        *next += 1;
        let mut row = object.clone();
        row.id = Some(id);
        objects.insert(id, row);
        Ok(id)
    }

    fn update_object(&self, object: &GovernanceObject) -> Result<(), StoreError> {
        let id = object.id.ok_or(StoreError::MissingId("governance object"))?;
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&id) {
            return Err(StoreError::NotFound(format!("governance object {id}")));
        }
        check_hash_free(&objects, object, Some(id))?;
        objects.insert(id, object.clone());
        Ok(())
    }

    fn get_object(&self, id: ObjectId) -> Result<GovernanceObject, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("governance object {id}")))
    }

    fn find_by_hash(&self, hash: &GovHash, origin: Origin) -> Result<Option<ObjectId>, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .values()
            .find(|o| o.hash.as_ref() == Some(hash) && o.origin == origin)
            .and_then(|o| o.id))
    }

    fn query_objects(&self, filter: &ObjectFilter) -> Result<Vec<ObjectId>, StoreError> {
        Ok(filter.select(self.objects.lock().unwrap().values()))
    }
}

impl EventStore for NullStore {
    fn insert_event(&self, event: &Event) -> Result<EventId, StoreError> {
        if let Some(id) = event.id {
            return Err(StoreError::Duplicate(format!("event already stored as {}", id.raw())));
        }
        self.check_events_accepted()?;
        let mut next = self.next_event_id.lock().unwrap();
        let id = EventId::new(*next);
        *next += 1;
        let mut row = event.clone();
        row.id = Some(id);
        self.events.lock().unwrap().insert(id, row);
        Ok(id)
    }

    fn update_event(&self, event: &Event) -> Result<(), StoreError> {
        let id = event.id.ok_or(StoreError::MissingId("event"))?;
        let mut events = self.events.lock().unwrap();
        if !events.contains_key(&id) {
            return Err(StoreError::NotFound(format!("event {}", id.raw())));
        }
        events.insert(id, event.clone());
        Ok(())
    }

    fn get_event(&self, id: EventId) -> Result<Event, StoreError> {
        self.events
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("event {}", id.raw())))
    }

    fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventId>, StoreError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| filter.matches(e))
            .filter_map(|e| e.id)
            .collect())
    }
}

impl Store for NullStore {
    fn insert_object_with_event(
        &self,
        object: &GovernanceObject,
        start: Timestamp,
    ) -> Result<(ObjectId, EventId), StoreError> {
        if let Some(id) = object.id {
            return Err(StoreError::Duplicate(format!("object already stored as {id}")));
        }
        self.check_events_accepted()?;
        let mut objects = self.objects.lock().unwrap();
        check_hash_free(&objects, object, None)?;

        let mut next_object = self.next_object_id.lock().unwrap();
        let object_id = ObjectId::new(*next_object);
        *next_object += 1;
        let mut row = object.clone();
        row.id = Some(object_id);
        objects.insert(object_id, row);

        let mut next_event = self.next_event_id.lock().unwrap();
        let event_id = EventId::new(*next_event);
        *next_event += 1;
        let mut event = Event::new(object_id, start);
        event.id = Some(event_id);
        self.events.lock().unwrap().insert(event_id, event);
        Ok((object_id, event_id))
    }
}
