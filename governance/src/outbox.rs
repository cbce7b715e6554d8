//! Two-phase delivery of local objects to the network.
//!
//! Phase one (prepare) pays the collateral; a non-hash answer ends the
//! event in the errored state, which nothing retries automatically.
//! Phase two (submit) broadcasts the object once the collateral has
//! confirmed; a non-hash answer is assumed to mean "not yet" and the
//! event is retried on the next pass.

use sentinel_chain::ChainClient;
use sentinel_store::{EventFilter, Store};
use sentinel_types::{is_hash, EventId, GovHash, Timestamp};

use crate::{GovernanceError, Sentinel};

/// Counts from one outbox pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboxReport {
    pub prepared: usize,
    pub errored: usize,
    pub submitted: usize,
    /// Events left untouched to be retried on a later pass.
    pub waiting: usize,
}

enum Step {
    Done,
    Failed,
    Wait,
}

impl<S: Store, C: ChainClient> Sentinel<S, C> {
    /// Run both outbox phases over every due event.
    pub async fn process_events(&self, now: Timestamp) -> Result<OutboxReport, GovernanceError> {
        let mut report = OutboxReport::default();

        let to_prepare = self.store.query_events(&EventFilter::ToPrepare { now })?;
        tracing::debug!(count = to_prepare.len(), "events to prepare");
        for id in to_prepare {
            match self.prepare_event(id, now).await? {
                Step::Done => report.prepared += 1,
                Step::Failed => report.errored += 1,
                Step::Wait => report.waiting += 1,
            }
        }

        let to_submit = self.store.query_events(&EventFilter::ToSubmit { now })?;
        tracing::debug!(count = to_submit.len(), "events to submit");
        for id in to_submit {
            match self.submit_event(id, now).await? {
                Step::Done => report.submitted += 1,
                Step::Failed => report.errored += 1,
                Step::Wait => report.waiting += 1,
            }
        }

        Ok(report)
    }

    async fn prepare_event(&self, id: EventId, now: Timestamp) -> Result<Step, GovernanceError> {
        let mut event = self.store.get_event(id)?;
        let mut object = self.store.get_object(event.governance_object_id)?;

        let reply = match self.chain.prepare(&object).await {
            Ok(reply) => reply,
            Err(e) if e.is_transient() => {
                tracing::warn!(event_id = id.raw(), error = %e, "prepare not delivered, will retry");
                return Ok(Step::Wait);
            }
            Err(e) => e.to_string(),
        };

        if is_hash(&reply) {
            let fee_tx = GovHash::from_hex(&reply)?;
            object.fee_tx = Some(fee_tx);
            self.store.update_object(&object)?;
            event.mark_prepared(now)?;
            self.store.update_event(&event)?;
            tracing::info!(
                event_id = id.raw(),
                object_id = %event.governance_object_id,
                fee_tx = %fee_tx,
                "prepared governance object"
            );
            Ok(Step::Done)
        } else {
            tracing::error!(event_id = id.raw(), reply = %reply.trim(), "prepare failed, event errored");
            event.mark_errored(now, reply)?;
            self.store.update_event(&event)?;
            Ok(Step::Failed)
        }
    }

    async fn submit_event(&self, id: EventId, now: Timestamp) -> Result<Step, GovernanceError> {
        let mut event = self.store.get_event(id)?;
        let mut object = self.store.get_object(event.governance_object_id)?;

        let Some(fee_tx) = object.fee_tx else {
            tracing::warn!(event_id = id.raw(), "no fee transaction on prepared object, waiting");
            return Ok(Step::Wait);
        };

        let reply = match self.chain.submit(&fee_tx, &object).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::info!(event_id = id.raw(), error = %e, "submit not accepted yet");
                return Ok(Step::Wait);
            }
        };
        if !is_hash(&reply) {
            tracing::info!(event_id = id.raw(), reply = %reply.trim(), "submit not accepted yet");
            return Ok(Step::Wait);
        }

        let hash = GovHash::from_hex(&reply)?;
        event.mark_submitted(now)?;
        self.store.update_event(&event)?;
        object.hash = Some(hash);
        self.store.update_object(&object)?;
        tracing::info!(
            event_id = id.raw(),
            object_id = %event.governance_object_id,
            %hash,
            "submitted governance object"
        );
        Ok(Step::Done)
    }
}
