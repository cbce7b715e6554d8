//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use sentinel_store::{EventFilter, EventStore, GovernanceStore, ObjectFilter, Store, StoreError};
use sentinel_types::{Event, EventId, GovHash, GovernanceObject, ObjectId, Origin, Timestamp};

use crate::meta::{self, CURRENT_SCHEMA_VERSION};
use crate::{LmdbError, LmdbEventStore, LmdbGovernanceStore};

/// Number of named databases the sentinel opens.
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    objects_db: Database<Bytes, Bytes>,
    object_hash_db: Database<Bytes, Bytes>,
    events_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The directory is created if missing. A database written by a newer
    /// schema version is refused.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("cannot create {}: {e}", path.display())))?;

        // SAFETY: the environment is opened once per process and the data
        // file is not modified by anything outside LMDB.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let objects_db = env.create_database(&mut wtxn, Some("objects"))?;
        let object_hash_db = env.create_database(&mut wtxn, Some("object_hash"))?;
        let events_db = env.create_database(&mut wtxn, Some("events"))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;

        let found = meta::schema_version(&meta_db, &wtxn)?;
        if found > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if found < CURRENT_SCHEMA_VERSION {
            meta::set_schema_version(&meta_db, &mut wtxn, CURRENT_SCHEMA_VERSION)?;
            tracing::info!(from = found, to = CURRENT_SCHEMA_VERSION, "database schema initialised");
        }
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            objects_db,
            object_hash_db,
            events_db,
            meta_db,
        })
    }

    pub fn governance_store(&self) -> LmdbGovernanceStore {
        LmdbGovernanceStore {
            env: Arc::clone(&self.env),
            objects_db: self.objects_db,
            object_hash_db: self.object_hash_db,
            meta_db: self.meta_db,
        }
    }

    pub fn event_store(&self) -> LmdbEventStore {
        LmdbEventStore {
            env: Arc::clone(&self.env),
            events_db: self.events_db,
            meta_db: self.meta_db,
        }
    }

    /// Both stores over this environment, as one backend.
    pub fn store(&self) -> LmdbStore {
        LmdbStore {
            objects: self.governance_store(),
            events: self.event_store(),
        }
    }
}

/// Object and event stores sharing one environment.
pub struct LmdbStore {
    objects: LmdbGovernanceStore,
    events: LmdbEventStore,
}

impl GovernanceStore for LmdbStore {
    fn insert_object(&self, object: &GovernanceObject) -> Result<ObjectId, StoreError> {
        self.objects.insert_object(object)
    }

    fn update_object(&self, object: &GovernanceObject) -> Result<(), StoreError> {
        self.objects.update_object(object)
    }

    fn get_object(&self, id: ObjectId) -> Result<GovernanceObject, StoreError> {
        self.objects.get_object(id)
    }

    fn find_by_hash(&self, hash: &GovHash, origin: Origin) -> Result<Option<ObjectId>, StoreError> {
        self.objects.find_by_hash(hash, origin)
    }

    fn query_objects(&self, filter: &ObjectFilter) -> Result<Vec<ObjectId>, StoreError> {
        self.objects.query_objects(filter)
    }
}

impl EventStore for LmdbStore {
    fn insert_event(&self, event: &Event) -> Result<EventId, StoreError> {
        self.events.insert_event(event)
    }

    fn update_event(&self, event: &Event) -> Result<(), StoreError> {
        self.events.update_event(event)
    }

    fn get_event(&self, id: EventId) -> Result<Event, StoreError> {
        self.events.get_event(id)
    }

    fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventId>, StoreError> {
        self.events.query_events(filter)
    }
}

impl Store for LmdbStore {
    fn insert_object_with_event(
        &self,
        object: &GovernanceObject,
        start: Timestamp,
    ) -> Result<(ObjectId, EventId), StoreError> {
        let mut wtxn = self.objects.env.write_txn().map_err(LmdbError::from)?;
        let object_id = self.objects.put_new(&mut wtxn, object)?;
        let event_id = self.events.put_new(&mut wtxn, &Event::new(object_id, start))?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok((object_id, event_id))
    }
}
