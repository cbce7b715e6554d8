//! Canonical wire form of governance payloads.
//!
//! A payload travels as hex-encoded JSON of the shape
//! `[["<type-tag>", {<fields>}]]`, keys sorted, with `", "` / `": "`
//! separators and non-ASCII characters escaped. Every node must produce the
//! same bytes for the same payload, otherwise object hashes diverge.
//!
//! Only identity fields are carried. Row ids, vote tallies, status, origin,
//! validity and the generated superblock name stay node-local.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::object::{ObjectType, Payload};
use crate::proposal::Proposal;
use crate::superblock::Superblock;
use crate::DecodeError;

/// A canonical field value. Payloads only carry text and unsigned integers.
enum Field<'a> {
    Text(&'a str),
    Integer(u64),
}

/// Render the canonical JSON text of a payload.
///
/// The text is built by appending to a `String`, so rendering cannot fail.
pub fn canonical_json(payload: &Payload) -> String {
    let mut out = String::from("[[");
    push_text(&mut out, payload.object_type().tag());
    out.push_str(", {");
    for (i, (key, value)) in fields(payload).into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_text(&mut out, key);
        out.push_str(": ");
        match value {
            Field::Text(text) => push_text(&mut out, text),
            Field::Integer(n) => out.push_str(&n.to_string()),
        }
    }
    out.push_str("}]]");
    out
}

/// Hex-encode the canonical JSON of a payload.
pub fn encode_hex(payload: &Payload) -> String {
    hex::encode(canonical_json(payload))
}

/// Decode a hex payload received from the network.
///
/// Accepts the `[[tag, fields]]` envelope as well as a bare `[tag, fields]`
/// pair. Unknown tags are rejected with [`DecodeError::UnknownObjectType`].
pub fn decode_hex(data_hex: &str) -> Result<Payload, DecodeError> {
    let value = parse_hex(data_hex)?;
    let (tag, fields) = split_envelope(&value)?;
    match ObjectType::from_tag(tag) {
        Some(ObjectType::Proposal) => Ok(Payload::Proposal(Proposal {
            name: text(fields, "proposal_name")?,
            start_epoch: integer(fields, "start_epoch")?,
            end_epoch: integer(fields, "end_epoch")?,
            payment_address: text(fields, "payment_address")?,
            payment_amount: text(fields, "payment_amount")?,
        })),
        Some(ObjectType::Trigger) => Ok(Payload::Trigger(Superblock {
            event_block_height: integer(fields, "event_block_height")?,
            payment_addresses: text(fields, "payment_addresses")?,
            payment_amounts: text(fields, "payment_amounts")?,
        })),
        None => Err(DecodeError::UnknownObjectType(tag.to_string())),
    }
}

/// The object type named by a payload's envelope, even when its fields
/// do not decode.
pub fn peek_object_type(data_hex: &str) -> Option<ObjectType> {
    let value = parse_hex(data_hex).ok()?;
    let (tag, _) = split_envelope(&value).ok()?;
    ObjectType::from_tag(tag)
}

fn parse_hex(data_hex: &str) -> Result<Value, DecodeError> {
    let bytes = hex::decode(data_hex.trim()).map_err(|e| DecodeError::Hex(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))
}

fn split_envelope(value: &Value) -> Result<(&str, &Map<String, Value>), DecodeError> {
    let outer = value
        .as_array()
        .ok_or(DecodeError::Shape("top level is not an array"))?;
    let pair = match outer.first() {
        Some(Value::Array(inner)) => inner.as_slice(),
        Some(Value::String(_)) => outer.as_slice(),
        _ => return Err(DecodeError::Shape("envelope is empty")),
    };
    let [tag, fields] = pair else {
        return Err(DecodeError::Shape("pair does not have two elements"));
    };
    let tag = tag
        .as_str()
        .ok_or(DecodeError::Shape("type tag is not a string"))?;
    let fields = fields
        .as_object()
        .ok_or(DecodeError::Shape("fields are not an object"))?;
    Ok((tag, fields))
}

fn fields(payload: &Payload) -> BTreeMap<&'static str, Field<'_>> {
    let mut map = BTreeMap::new();
    match payload {
        Payload::Proposal(p) => {
            map.insert("proposal_name", Field::Text(&p.name));
            map.insert("start_epoch", Field::Integer(p.start_epoch));
            map.insert("end_epoch", Field::Integer(p.end_epoch));
            map.insert("payment_address", Field::Text(&p.payment_address));
            map.insert("payment_amount", Field::Text(&p.payment_amount));
        }
        Payload::Trigger(sb) => {
            map.insert("event_block_height", Field::Integer(sb.event_block_height));
            map.insert("payment_addresses", Field::Text(&sb.payment_addresses));
            map.insert("payment_amounts", Field::Text(&sb.payment_amounts));
        }
    }
    map.insert("type", Field::Integer(u64::from(payload.object_type().code())));
    map
}

/// Append `text` as a quoted JSON string, escaping everything outside
/// printable ASCII as UTF-16 `\uXXXX` units.
fn push_text(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
}

fn text(fields: &Map<String, Value>, name: &'static str) -> Result<String, DecodeError> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(DecodeError::InvalidField {
            field: name,
            value: other.to_string(),
        }),
        None => Err(DecodeError::MissingField(name)),
    }
}

fn integer(fields: &Map<String, Value>, name: &'static str) -> Result<u64, DecodeError> {
    let invalid = |value: String| DecodeError::InvalidField { field: name, value };
    match fields.get(name) {
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
        None => Err(DecodeError::MissingField(name)),
    }
}
