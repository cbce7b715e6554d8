//! Counters and schema version kept in the `meta` database.

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use crate::LmdbError;

/// Schema version written by this code.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
pub(crate) const NEXT_OBJECT_ID_KEY: &[u8] = b"next_object_id";
pub(crate) const NEXT_EVENT_ID_KEY: &[u8] = b"next_event_id";

/// Reserve the next row id under `key`. Ids start at 1.
pub(crate) fn next_id(
    meta_db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
    key: &[u8],
) -> Result<u64, LmdbError> {
    let current = match meta_db.get(wtxn, key)? {
        Some(bytes) => decode_u64(bytes)?,
        None => 1,
    };
    meta_db.put(wtxn, key, &(current + 1).to_be_bytes())?;
    Ok(current)
}

pub(crate) fn schema_version(
    meta_db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn,
) -> Result<u32, LmdbError> {
    match meta_db.get(rtxn, SCHEMA_VERSION_KEY)? {
        Some(bytes) if bytes.len() == 4 => {
            let mut arr = [0u8; 4];
            arr.copy_from_slice(bytes);
            Ok(u32::from_le_bytes(arr))
        }
        Some(_) => Err(LmdbError::Serialization(
            "schema_version has unexpected byte length".to_string(),
        )),
        None => Ok(0),
    }
}

pub(crate) fn set_schema_version(
    meta_db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
    version: u32,
) -> Result<(), LmdbError> {
    meta_db.put(wtxn, SCHEMA_VERSION_KEY, &version.to_le_bytes())?;
    Ok(())
}

pub(crate) fn decode_u64(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("expected 8-byte key, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}
