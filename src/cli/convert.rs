//! JSON <-> Value conversion

use chrono::SecondsFormat;

use crate::Value;

/// Converts a parsed JSON document into a [`Value`].
///
/// Integral numbers that fit an i64 become integers, every other number a
/// float.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Converts a [`Value`] to JSON.
///
/// Times become RFC 3339 strings and durations a number of seconds. Floats
/// without a JSON representation (NaN, infinities) become `null`.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => float(f),
        Value::String(s) => serde_json::Value::String(s),
        Value::Time(t) => {
            serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Value::Duration(d) => match d.subsec_nanos() {
            0 => serde_json::Value::Number(d.num_seconds().into()),
            nanos => float(d.num_seconds() as f64 + f64::from(nanos) / 1e9),
        },
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

fn float(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
