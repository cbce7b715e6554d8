//! Copy the network's governance objects into the local store.

use sentinel_chain::{ChainClient, RemoteObject};
use sentinel_store::Store;
use sentinel_types::codec::{decode_hex, peek_object_type};
use sentinel_types::{GovernanceObject, ObjectStatus, ObjectType, Origin, Payload, Timestamp, Validity};

use crate::{GovernanceError, Sentinel};

/// Counts from one ingest pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub refreshed: usize,
    /// Inserted objects whose payload did not decode; stored as invalid.
    pub undecodable: usize,
}

fn fallback_name(payload: &Payload, remote: &RemoteObject) -> String {
    if !remote.name.is_empty() {
        return remote.name.clone();
    }
    match payload {
        Payload::Proposal(p) => p.name.clone(),
        Payload::Trigger(_) => format!("sb-{}", &remote.hash.to_string()[..8]),
    }
}

/// A REMOTE row carrying the network's identity, tallies and raw data.
fn remote_row(name: String, payload: Payload, remote: &RemoteObject, now: Timestamp) -> GovernanceObject {
    let mut object = GovernanceObject::new(name, payload, Origin::Remote, now);
    object.hash = Some(remote.hash);
    object.fee_tx = remote.collateral_hash;
    object.data_hex = remote.data_hex.clone();
    object.absolute_yes_count = remote.absolute_yes_count;
    object.yes_count = remote.yes_count;
    object.no_count = remote.no_count;
    object
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    /// Pull the node's object list; store unseen objects with their
    /// validity verdict and refresh vote tallies of known ones.
    ///
    /// Objects are keyed by network hash among REMOTE rows, so seeing the
    /// same object twice never creates a second row. A payload that does
    /// not decode is stored as invalid with empty fields and its raw data.
    pub async fn ingest(&self, now: Timestamp) -> Result<IngestReport, GovernanceError> {
        let mut report = IngestReport::default();
        for remote in self.chain.governance_objects().await? {
            if let Some(id) = self.store.find_by_hash(&remote.hash, Origin::Remote)? {
                let mut known = self.store.get_object(id)?;
                if (known.absolute_yes_count, known.yes_count, known.no_count)
                    != (remote.absolute_yes_count, remote.yes_count, remote.no_count)
                {
                    known.absolute_yes_count = remote.absolute_yes_count;
                    known.yes_count = remote.yes_count;
                    known.no_count = remote.no_count;
                    self.store.update_object(&known)?;
                    report.refreshed += 1;
                }
                continue;
            }

            let mut object = match decode_hex(&remote.data_hex) {
                Ok(payload) => {
                    let mut object = remote_row(fallback_name(&payload, &remote), payload, &remote, now);
                    object.validity = self.validate(&object, now)?;
                    object
                }
                Err(e) => {
                    tracing::warn!(hash = %remote.hash, error = %e, "undecodable object, storing as invalid");
                    let kind = peek_object_type(&remote.data_hex).unwrap_or(ObjectType::Proposal);
                    let name = if remote.name.is_empty() {
                        format!("bad-{}", &remote.hash.to_string()[..8])
                    } else {
                        remote.name.clone()
                    };
                    let mut object = remote_row(name, Payload::empty(kind), &remote, now);
                    object.validity = Validity::Invalid;
                    report.undecodable += 1;
                    object
                }
            };
            object.advance_status(ObjectStatus::New)?;

            let id = self.store.insert_object(&object)?;
            tracing::info!(
                object_id = %id,
                hash = %remote.hash,
                kind = object.object_type().tag(),
                validity = ?object.validity,
                "ingested governance object"
            );
            report.inserted += 1;
        }
        Ok(report)
    }
}
