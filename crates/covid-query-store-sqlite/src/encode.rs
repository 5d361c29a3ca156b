//! Conversions between pipeline values and SQLite values.

use covid_query_core::{plan::ParamValue, store::Value};
use rusqlite::types::{Value as SqlValue, ValueRef};

pub fn encode_param(value: &ParamValue) -> SqlValue {
  match value {
    ParamValue::Text(s) => SqlValue::Text(s.clone()),
    ParamValue::Integer(n) => SqlValue::Integer(*n),
  }
}

/// Blobs are rendered as lowercase hex; the schema has no blob columns.
pub fn decode_value(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(n) => Value::Integer(n),
    ValueRef::Real(x) => Value::Real(x),
    ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    ValueRef::Blob(bytes) => Value::Text(hex::encode(bytes)),
  }
}
