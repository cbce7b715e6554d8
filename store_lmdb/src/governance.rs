//! LMDB implementation of GovernanceStore.
//!
//! Objects are bincode rows keyed by big-endian id, so iteration runs in
//! insertion order. `object_hash` maps `origin ‖ hash` to the owning id.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn, RwTxn};

use sentinel_store::{GovernanceStore, ObjectFilter, StoreError};
use sentinel_types::{GovHash, GovernanceObject, ObjectId, Origin};

use crate::meta::{self, NEXT_OBJECT_ID_KEY};
use crate::LmdbError;

pub struct LmdbGovernanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) objects_db: Database<Bytes, Bytes>,
    pub(crate) object_hash_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

fn hash_key(hash: &GovHash, origin: Origin) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[0] = match origin {
        Origin::Local => 0,
        Origin::Remote => 1,
    };
    key[1..].copy_from_slice(hash.as_bytes());
    key
}

impl LmdbGovernanceStore {
    fn read_row(&self, rtxn: &RoTxn, id: ObjectId) -> Result<Option<GovernanceObject>, LmdbError> {
        match self.objects_db.get(rtxn, &id.raw().to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    /// Fail if the object's `(origin, hash)` key belongs to a row other than `owner`.
    fn check_hash_free(
        &self,
        rtxn: &RoTxn,
        object: &GovernanceObject,
        owner: Option<ObjectId>,
    ) -> Result<(), StoreError> {
        let Some(hash) = &object.hash else {
            return Ok(());
        };
        let key = hash_key(hash, object.origin);
        let Some(bytes) = self.object_hash_db.get(rtxn, &key).map_err(LmdbError::from)? else {
            return Ok(());
        };
        let indexed = ObjectId::new(meta::decode_u64(bytes)?);
        if Some(indexed) == owner {
            return Ok(());
        }
        Err(StoreError::Duplicate(format!(
            "{} object with hash {hash} is stored as {indexed}",
            object.origin.as_str()
        )))
    }

    /// Write a new row inside `wtxn`. Nothing is committed.
    pub(crate) fn put_new(&self, wtxn: &mut RwTxn, object: &GovernanceObject) -> Result<ObjectId, StoreError> {
        if let Some(id) = object.id {
            return Err(StoreError::Duplicate(format!("object already stored as {id}")));
        }
        self.check_hash_free(wtxn, object, None)?;

        let id = ObjectId::new(meta::next_id(&self.meta_db, wtxn, NEXT_OBJECT_ID_KEY)?);
        let mut row = object.clone();
        row.id = Some(id);
        let bytes = bincode::serialize(&row).map_err(LmdbError::from)?;
        self.objects_db
            .put(wtxn, &id.raw().to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        if let Some(hash) = &row.hash {
            self.object_hash_db
                .put(wtxn, &hash_key(hash, row.origin), &id.raw().to_be_bytes())
                .map_err(LmdbError::from)?;
        }
        Ok(id)
    }
}

impl GovernanceStore for LmdbGovernanceStore {
    fn insert_object(&self, object: &GovernanceObject) -> Result<ObjectId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = self.put_new(&mut wtxn, object)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(%id, name = %object.name, "inserted governance object");
        Ok(id)
    }

    fn update_object(&self, object: &GovernanceObject) -> Result<(), StoreError> {
        let id = object.id.ok_or(StoreError::MissingId("governance object"))?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let previous = self
            .read_row(&wtxn, id)?
            .ok_or_else(|| LmdbError::NotFound(format!("governance object {id}")))?;

        let old_key = previous.hash.map(|h| hash_key(&h, previous.origin));
        let new_key = object.hash.map(|h| hash_key(&h, object.origin));
        if old_key != new_key {
            self.check_hash_free(&wtxn, object, Some(id))?;
            if let Some(key) = old_key {
                self.object_hash_db
                    .delete(&mut wtxn, &key)
                    .map_err(LmdbError::from)?;
            }
            if let Some(key) = new_key {
                self.object_hash_db
                    .put(&mut wtxn, &key, &id.raw().to_be_bytes())
                    .map_err(LmdbError::from)?;
            }
        }

        let bytes = bincode::serialize(object).map_err(LmdbError::from)?;
        self.objects_db
            .put(&mut wtxn, &id.raw().to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_object(&self, id: ObjectId) -> Result<GovernanceObject, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let object = self
            .read_row(&rtxn, id)?
            .ok_or_else(|| LmdbError::NotFound(format!("governance object {id}")))?;
        Ok(object)
    }

    fn find_by_hash(&self, hash: &GovHash, origin: Origin) -> Result<Option<ObjectId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .object_hash_db
            .get(&rtxn, &hash_key(hash, origin))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(ObjectId::new(meta::decode_u64(bytes)?))),
            None => Ok(None),
        }
    }

    fn query_objects(&self, filter: &ObjectFilter) -> Result<Vec<ObjectId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut objects = Vec::new();
        for entry in self.objects_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            let object: GovernanceObject = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            objects.push(object);
        }
        Ok(filter.select(&objects))
    }
}
