//! JSON <-> Value conversion utilities

use std::collections::HashSet;

use crate::value::{Identity, Value};

/// Convert serde_json::Value to a query Value.
///
/// Null members and elements are dropped on the way in.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::array(arr.into_iter().map(json_to_value)),
        serde_json::Value::Object(obj) => {
            Value::object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))))
        }
    }
}

/// Convert a query Value to serde_json::Value.
///
/// A container met again below itself is emitted as null.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    let mut active = HashSet::new();
    to_json_guarded(v, &mut active)
}

fn to_json_guarded(v: &Value, active: &mut HashSet<Identity>) -> serde_json::Value {
    if let Some(id) = v.identity()
        && !active.insert(id)
    {
        return serde_json::Value::Null;
    }

    let converted = match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => serde_json::Value::Array(
            arr.borrow()
                .iter()
                .map(|item| to_json_guarded(item, active))
                .collect(),
        ),
        Value::Object(obj) => serde_json::Value::Object(
            obj.borrow()
                .iter()
                .map(|(k, item)| (k.clone(), to_json_guarded(item, active)))
                .collect(),
        ),
    };

    if let Some(id) = v.identity() {
        active.remove(&id);
    }
    converted
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        json_to_value(v)
    }
}
