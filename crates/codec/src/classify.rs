//! Classification of raw runtime values into [`DynamicValue`]s.
//!
//! Whatever the bridge hands back (parsed JSON, a native engine handle)
//! implements [`RuntimeValue`] by describing its runtime kind. Map-like
//! values become maps, array-like values sequences, everything else a leaf.

use js_bridge_value::{CodingPath, DynamicValue, IntWidth, ScriptDate, ScriptInt, ValueMap};

use crate::error::DecodeError;

/// What a runtime reports about one of its values.
#[derive(Debug)]
pub enum RuntimeView<'a, R: ?Sized> {
    Null,
    Undefined,
    Bool(bool),
    /// The runtime's single numeric type.
    Number(f64),
    /// An integer the bridge already knows exactly.
    Integer(i128),
    String(&'a str),
    /// A native date, as epoch milliseconds.
    Date(f64),
    Array(Vec<&'a R>),
    Object(Vec<(&'a str, &'a R)>),
    /// A host object with no dynamic representation.
    Opaque(String),
}

pub trait RuntimeValue {
    fn view(&self) -> RuntimeView<'_, Self>;
}

/// Classifies `raw` and everything nested in it.
pub fn classify<R: RuntimeValue + ?Sized>(raw: &R) -> Result<DynamicValue, DecodeError> {
    classify_at(raw, &CodingPath::root())
}

fn classify_at<R: RuntimeValue + ?Sized>(raw: &R, path: &CodingPath) -> Result<DynamicValue, DecodeError> {
    Ok(match raw.view() {
        RuntimeView::Null | RuntimeView::Undefined => DynamicValue::Null,
        RuntimeView::Bool(b) => DynamicValue::Bool(b),
        RuntimeView::Number(n) => DynamicValue::from_f64(n),
        RuntimeView::Integer(i) => exact_integer(i),
        RuntimeView::String(s) => DynamicValue::String(s.to_owned()),
        RuntimeView::Date(millis) => DynamicValue::Date(ScriptDate::from_epoch_millis(millis)),
        RuntimeView::Array(items) => DynamicValue::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| classify_at(item, &path.child(index)))
                .collect::<Result<_, _>>()?,
        ),
        RuntimeView::Object(entries) => {
            let mut map = ValueMap::with_capacity(entries.len());
            for (key, item) in entries {
                map.insert(key.to_owned(), classify_at(item, &path.child(key))?);
            }
            DynamicValue::Map(map)
        }
        RuntimeView::Opaque(type_name) => {
            return Err(DecodeError::corrupted(
                format!("runtime value of type {type_name} has no dynamic representation"),
                path,
            ))
        }
    })
}

fn exact_integer(value: i128) -> DynamicValue {
    [IntWidth::I64, IntWidth::U64]
        .into_iter()
        .find_map(|width| ScriptInt::new(width, value))
        .map_or(DynamicValue::Float(value as f64), DynamicValue::Integer)
}

impl RuntimeValue for serde_json::Value {
    fn view(&self) -> RuntimeView<'_, Self> {
        use serde_json::Value;
        match self {
            Value::Null => RuntimeView::Null,
            Value::Bool(b) => RuntimeView::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RuntimeView::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    RuntimeView::Integer(i128::from(u))
                } else {
                    n.as_f64()
                        .map_or_else(|| RuntimeView::Opaque(n.to_string()), RuntimeView::Number)
                }
            }
            Value::String(s) => RuntimeView::String(s),
            Value::Array(items) => RuntimeView::Array(items.iter().collect()),
            Value::Object(entries) => {
                RuntimeView::Object(entries.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_bridge_value::ValueKind;
    use serde_json::json;

    #[test]
    fn json_classification_matrix() {
        let cases = [
            (json!(null), ValueKind::Null),
            (json!(true), ValueKind::Bool),
            (json!(5), ValueKind::Integer),
            (json!(2.0), ValueKind::Integer),
            (json!(2.5), ValueKind::Float),
            (json!(u64::MAX), ValueKind::Integer),
            (json!("s"), ValueKind::String),
            (json!([1, 2]), ValueKind::Sequence),
            (json!({}), ValueKind::Map),
        ];
        for (raw, kind) in cases {
            assert_eq!(classify(&raw).expect("classify").kind(), kind, "classifying {raw}");
        }
    }

    #[test]
    fn nested_structure_keeps_order_and_values() {
        let value = classify(&json!({"b": [1, "x"], "a": {"c": null}})).expect("classify");
        let keys: Vec<_> = value.as_map().expect("map").keys().cloned().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(
            value.get("b"),
            Some(&DynamicValue::Sequence(vec![1i64.into(), "x".into()]))
        );
    }

    #[test]
    fn exact_integers_beyond_u64_fall_back_to_float() {
        assert_eq!(exact_integer(-1), DynamicValue::from(-1i64));
        assert_eq!(exact_integer(u64::MAX as i128), DynamicValue::from(u64::MAX));
        assert_eq!(exact_integer(u64::MAX as i128 + 1).kind(), ValueKind::Float);
    }
}
