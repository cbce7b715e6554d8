//! The governance envelope shared by proposals and superblocks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::hash::GovHash;
use crate::proposal::Proposal;
use crate::superblock::Superblock;
use crate::time::Timestamp;
use crate::TypesError;

/// Revision number of a freshly created object.
pub const FIRST_REVISION: u32 = 1;

/// Store-assigned row identifier of a governance object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object type codes understood by the chain node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Proposal,
    Trigger,
}

impl ObjectType {
    /// Tag used in the first slot of the canonical `[type, fields]` pair.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Proposal => "proposal",
            Self::Trigger => "trigger",
        }
    }

    /// Numeric code carried in the `type` field of the payload.
    pub fn code(&self) -> u8 {
        match self {
            Self::Proposal => 1,
            Self::Trigger => 2,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "proposal" => Some(Self::Proposal),
            "trigger" => Some(Self::Trigger),
            _ => None,
        }
    }
}

/// Local processing status of an object.
///
/// Moves forward only: `Unknown → New → (Voted | Submitted)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectStatus {
    Unknown,
    New,
    Valid,
    Voted,
    Submitted,
}

impl ObjectStatus {
    fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::New => 1,
            Self::Valid => 2,
            Self::Voted | Self::Submitted => 3,
        }
    }

    /// Whether `next` lies strictly ahead of this status.
    pub fn can_advance_to(&self, next: ObjectStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::New => "NEW",
            Self::Valid => "VALID",
            Self::Voted => "VOTED",
            Self::Submitted => "SUBMITTED",
        }
    }
}

impl fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the object was created by this node or observed on the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Local,
    Remote,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Remote => "REMOTE",
        }
    }
}

/// Tri-state validity verdict. `Undetermined` means the node abstains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validity {
    Valid,
    Invalid,
    Undetermined,
}

impl From<Option<bool>> for Validity {
    fn from(verdict: Option<bool>) -> Self {
        match verdict {
            Some(true) => Self::Valid,
            Some(false) => Self::Invalid,
            None => Self::Undetermined,
        }
    }
}

impl From<bool> for Validity {
    fn from(verdict: bool) -> Self {
        Some(verdict).into()
    }
}

/// Type-specific body of a governance object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Proposal(Proposal),
    Trigger(Superblock),
}

impl Payload {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Proposal(_) => ObjectType::Proposal,
            Self::Trigger(_) => ObjectType::Trigger,
        }
    }

    /// A payload of `kind` with every field empty. Stands in for network
    /// data that could not be decoded.
    pub fn empty(kind: ObjectType) -> Self {
        match kind {
            ObjectType::Proposal => Self::Proposal(Proposal::default()),
            ObjectType::Trigger => Self::Trigger(Superblock::default()),
        }
    }

    pub fn as_proposal(&self) -> Option<&Proposal> {
        match self {
            Self::Proposal(p) => Some(p),
            Self::Trigger(_) => None,
        }
    }

    pub fn as_superblock(&self) -> Option<&Superblock> {
        match self {
            Self::Trigger(sb) => Some(sb),
            Self::Proposal(_) => None,
        }
    }
}

/// A governance object: the common envelope plus its typed payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceObject {
    /// Row id, `None` until the store persists the object.
    pub id: Option<ObjectId>,
    /// Network hash, assigned by the chain node.
    pub hash: Option<GovHash>,
    pub parent_hash: GovHash,
    pub name: String,
    pub revision: u32,
    pub creation_time: Timestamp,
    /// Collateral (fee) transaction returned by the prepare step.
    pub fee_tx: Option<GovHash>,
    /// Hex-encoded canonical payload, see [`codec`].
    pub data_hex: String,
    pub absolute_yes_count: i64,
    pub yes_count: i64,
    pub no_count: i64,
    pub status: ObjectStatus,
    pub origin: Origin,
    pub validity: Validity,
    pub payload: Payload,
}

impl GovernanceObject {
    /// Build a fresh object stamped with `creation_time`.
    ///
    /// The canonical payload is computed immediately so the object can be
    /// submitted without a separate [`update_object_data`](Self::update_object_data) call.
    pub fn new(name: impl Into<String>, payload: Payload, origin: Origin, creation_time: Timestamp) -> Self {
        let mut obj = Self {
            id: None,
            hash: None,
            parent_hash: GovHash::ZERO,
            name: name.into(),
            revision: FIRST_REVISION,
            creation_time,
            fee_tx: None,
            data_hex: String::new(),
            absolute_yes_count: 0,
            yes_count: 0,
            no_count: 0,
            status: ObjectStatus::Unknown,
            origin,
            validity: Validity::Undetermined,
            payload,
        };
        obj.update_object_data();
        obj
    }

    pub fn object_type(&self) -> ObjectType {
        self.payload.object_type()
    }

    /// Recompute `data_hex` from the current payload fields.
    ///
    /// Must run after any payload mutation meant for the network, before
    /// hashing or submission.
    pub fn update_object_data(&mut self) {
        self.data_hex = codec::encode_hex(&self.payload);
    }

    /// Move the status forward, refusing to go backwards.
    pub fn advance_status(&mut self, next: ObjectStatus) -> Result<(), TypesError> {
        if !self.status.can_advance_to(next) {
            return Err(TypesError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
