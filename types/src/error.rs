//! Error types for the object model.

use thiserror::Error;

use crate::object::ObjectStatus;

/// Errors raised while building or mutating governance records.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid hash: {0:?}")]
    InvalidHash(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("status cannot move from {from} to {to}")]
    InvalidStatusTransition { from: ObjectStatus, to: ObjectStatus },

    #[error("event is {state}, cannot {action}")]
    InvalidEventTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("payment list mismatch: {addresses} addresses, {amounts} amounts")]
    PaymentListMismatch { addresses: usize, amounts: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors decoding the canonical hex/JSON payload received from peers.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid hex: {0}")]
    Hex(String),

    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("payload shape is not [[type, fields]]: {0}")]
    Shape(&'static str),

    #[error("unknown object type tag: {0:?}")]
    UnknownObjectType(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field {field} has an unusable value: {value}")]
    InvalidField { field: &'static str, value: String },
}
