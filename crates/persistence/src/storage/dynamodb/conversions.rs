//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! attribute maps. These are testable in isolation without DynamoDB access.
//!
//! Numbers travel as DynamoDB `N` strings and come back through
//! `serde_json::Number`: integers that fit in `i64`/`u64` are exact, anything
//! else is read as `f64` (so `N("1.50")` decodes to `1.5`).

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Number, Value};

use skill_persistence_core::{AttributeMap, PersistenceError, Result, TableDescriptor};

/// A DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Item shape
// ============================================================================

/// Build the key map addressing the item for `partition_key`.
pub fn key_for(table: &TableDescriptor, partition_key: &str) -> Item {
    let mut key = HashMap::with_capacity(1);
    key.insert(
        table.partition_key_name().to_string(),
        AttributeValue::S(partition_key.to_string()),
    );
    key
}

/// Build the stored item: the partition key plus the encoded attributes.
pub fn attributes_to_item(
    table: &TableDescriptor,
    partition_key: &str,
    attributes: &AttributeMap,
) -> Item {
    let mut item = key_for(table, partition_key);
    item.insert(
        table.attributes_key_name().to_string(),
        AttributeValue::M(encode_attributes(attributes)),
    );
    item
}

/// Extract the attribute map from a stored item.
///
/// An item without the attributes attribute yields `None`.
pub fn item_to_attributes(table: &TableDescriptor, item: &Item) -> Result<Option<AttributeMap>> {
    match item.get(table.attributes_key_name()) {
        None => Ok(None),
        Some(AttributeValue::M(map)) => decode_attributes(map).map(Some),
        Some(_) => Err(PersistenceError::InvalidData(format!(
            "Attribute '{}' is not a map",
            table.attributes_key_name()
        ))),
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Encode an attribute map into DynamoDB's native representation.
pub fn encode_attributes(attributes: &AttributeMap) -> Item {
    attributes
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Encode a single JSON value.
pub fn encode_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(encode_value).collect()),
        Value::Object(map) => AttributeValue::M(encode_attributes(map)),
    }
}

/// Decode a DynamoDB map into an attribute map.
pub fn decode_attributes(item: &Item) -> Result<AttributeMap> {
    item.iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decode a single DynamoDB value.
///
/// Sets and binaries are only written by other clients; they decode to
/// lists and base64 strings.
pub fn decode_value(value: &AttributeValue) -> Result<Value> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(items) => items
            .iter()
            .map(decode_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        AttributeValue::M(map) => decode_attributes(map).map(Value::Object),
        AttributeValue::B(blob) => Ok(Value::String(encode_blob(blob))),
        AttributeValue::Ss(strings) => Ok(Value::Array(
            strings.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(numbers) => numbers
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        AttributeValue::Bs(blobs) => Ok(Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(encode_blob(blob)))
                .collect(),
        )),
        other => Err(PersistenceError::InvalidData(format!(
            "Unsupported attribute value: {:?}",
            other
        ))),
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Parse a DynamoDB number string.
fn parse_number(n: &str) -> Result<Number> {
    n.parse::<Number>()
        .map_err(|e| PersistenceError::InvalidData(format!("Invalid number {}: {}", n, e)))
}

fn encode_blob(blob: &Blob) -> String {
    STANDARD.encode(blob.as_ref())
}
