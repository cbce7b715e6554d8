//! Automatic voting on remote objects with a known verdict.

use sentinel_chain::{ChainClient, VoteOutcome, VoteSignal};
use sentinel_store::{ObjectFilter, Store};
use sentinel_types::{ObjectId, ObjectStatus, ObjectType, Origin, Validity};

use crate::{GovernanceError, Sentinel};

/// Objects voted on, and those whose vote failed, in one pass.
#[derive(Debug, Default)]
pub struct VoteReport {
    pub voted: Vec<ObjectId>,
    pub failed: Vec<(ObjectId, GovernanceError)>,
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    /// Vote `funding yes` on valid remote superblocks and `valid no` on
    /// every invalid remote object. Undetermined objects are left alone.
    ///
    /// A failed vote is reported for that object only; the sweep goes on.
    pub async fn auto_vote(&self) -> Result<VoteReport, GovernanceError> {
        let mut report = VoteReport::default();

        let valid_superblocks = ObjectFilter::new()
            .object_type(ObjectType::Trigger)
            .status(ObjectStatus::New)
            .origin(Origin::Remote)
            .validity(Validity::Valid);
        self.sweep(&valid_superblocks, VoteSignal::Funding, VoteOutcome::Yes, &mut report)
            .await?;

        let invalid_objects = ObjectFilter::new()
            .status(ObjectStatus::New)
            .origin(Origin::Remote)
            .validity(Validity::Invalid);
        self.sweep(&invalid_objects, VoteSignal::Valid, VoteOutcome::No, &mut report)
            .await?;

        Ok(report)
    }

    async fn sweep(
        &self,
        filter: &ObjectFilter,
        signal: VoteSignal,
        outcome: VoteOutcome,
        report: &mut VoteReport,
    ) -> Result<(), GovernanceError> {
        for id in self.store.query_objects(filter)? {
            match self.cast_vote(id, signal, outcome).await {
                Ok(()) => report.voted.push(id),
                Err(e) => {
                    tracing::error!(object_id = %id, %signal, %outcome, error = %e, "vote failed");
                    report.failed.push((id, e));
                }
            }
        }
        Ok(())
    }

    async fn cast_vote(
        &self,
        id: ObjectId,
        signal: VoteSignal,
        outcome: VoteOutcome,
    ) -> Result<(), GovernanceError> {
        let mut object = self.store.get_object(id)?;
        let hash = object.hash.ok_or(GovernanceError::MissingHash(id))?;
        let reply = self.chain.vote(&hash, signal, outcome).await?;
        object.advance_status(ObjectStatus::Voted)?;
        self.store.update_object(&object)?;
        tracing::info!(object_id = %id, %hash, %signal, %outcome, reply = %reply.trim(), "voted");
        Ok(())
    }
}
