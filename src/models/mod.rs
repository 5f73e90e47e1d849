//! Typed records for the trader and market data APIs.

pub mod market;
pub mod trade;

pub use market::*;
pub use trade::*;

use serde::Serialize;
use serde_json::Value;

/// Serialize a value to JSON with every `null` object member removed,
/// recursively. The order endpoints reject explicit nulls.
pub fn to_compact_json<T: Serialize>(value: &T) -> serde_json::Result<Value> {
    Ok(drop_nulls(serde_json::to_value(value)?))
}

fn drop_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, drop_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(drop_nulls).collect()),
        other => other,
    }
}
