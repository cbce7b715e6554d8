//! Governance object storage trait and its query filter.

use sentinel_types::{GovHash, GovernanceObject, ObjectId, ObjectStatus, ObjectType, Origin, Validity};

use crate::StoreError;

/// Trait for storing governance objects (proposals and superblocks).
pub trait GovernanceStore {
    /// Persist a new object and return its assigned id.
    ///
    /// Fails with [`StoreError::Duplicate`] if the object already carries an id.
    fn insert_object(&self, object: &GovernanceObject) -> Result<ObjectId, StoreError>;

    /// Overwrite an existing object row.
    fn update_object(&self, object: &GovernanceObject) -> Result<(), StoreError>;

    /// Load an object by id.
    fn get_object(&self, id: ObjectId) -> Result<GovernanceObject, StoreError>;

    /// Find the object with the given network hash and origin.
    fn find_by_hash(&self, hash: &GovHash, origin: Origin) -> Result<Option<ObjectId>, StoreError>;

    /// Ids of all objects matching `filter`, in the filter's order.
    fn query_objects(&self, filter: &ObjectFilter) -> Result<Vec<ObjectId>, StoreError>;
}

/// Result ordering for [`ObjectFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectOrder {
    /// Insertion order.
    #[default]
    ById,
    /// Ascending absolute yes count, ties in insertion order.
    AbsoluteYesAscending,
}

/// Conjunction of optional predicates over governance objects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectFilter {
    pub object_type: Option<ObjectType>,
    pub status: Option<ObjectStatus>,
    pub origin: Option<Origin>,
    pub validity: Option<Validity>,
    /// Minimum absolute yes count (inclusive).
    pub min_absolute_yes: Option<i64>,
    /// Superblocks targeting this height.
    pub event_block_height: Option<u64>,
    pub order: ObjectOrder,
}

impl ObjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_type(mut self, object_type: ObjectType) -> Self {
        self.object_type = Some(object_type);
        self
    }

    pub fn status(mut self, status: ObjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    pub fn min_absolute_yes(mut self, quorum: i64) -> Self {
        self.min_absolute_yes = Some(quorum);
        self
    }

    pub fn event_block_height(mut self, height: u64) -> Self {
        self.event_block_height = Some(height);
        self
    }

    pub fn order(mut self, order: ObjectOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether a single object satisfies every predicate.
    pub fn matches(&self, object: &GovernanceObject) -> bool {
        if self.object_type.is_some_and(|t| object.object_type() != t) {
            return false;
        }
        if self.status.is_some_and(|s| object.status != s) {
            return false;
        }
        if self.origin.is_some_and(|o| object.origin != o) {
            return false;
        }
        if self.validity.is_some_and(|v| object.validity != v) {
            return false;
        }
        if self.min_absolute_yes.is_some_and(|q| object.absolute_yes_count < q) {
            return false;
        }
        if let Some(height) = self.event_block_height {
            match object.payload.as_superblock() {
                Some(sb) if sb.event_block_height == height => {}
                _ => return false,
            }
        }
        true
    }

    /// Apply the filter and ordering to a set of stored objects.
    ///
    /// Objects without an id are skipped; backends share this so every
    /// implementation answers queries identically.
    pub fn select<'a, I>(&self, objects: I) -> Vec<ObjectId>
    where
        I: IntoIterator<Item = &'a GovernanceObject>,
    {
        let mut hits: Vec<(ObjectId, i64)> = objects
            .into_iter()
            .filter(|o| self.matches(o))
            .filter_map(|o| o.id.map(|id| (id, o.absolute_yes_count)))
            .collect();
        hits.sort_by_key(|(id, _)| *id);
        if self.order == ObjectOrder::AbsoluteYesAscending {
            hits.sort_by_key(|(_, yes)| *yes);
        }
        hits.into_iter().map(|(id, _)| id).collect()
    }
}
