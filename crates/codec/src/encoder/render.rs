//! Text rendering of a described value.
//!
//! A root leaf renders as script source. Sequences and maps are resolved to
//! a `serde_json::Value` and rendered once by serde_json, so nested strings
//! get exactly one layer of JSON escaping.

use js_bridge_value::{CodingPath, DynamicValue, ScriptInt};
use serde_json::{Map, Number, Value};

use crate::error::{EncodeError, EncodeErrorKind};

pub(crate) fn render(value: &DynamicValue, path: &CodingPath) -> Result<String, EncodeError> {
    Ok(match value {
        DynamicValue::Null => "null".to_string(),
        DynamicValue::Bool(true) => "true".to_string(),
        DynamicValue::Bool(false) => "false".to_string(),
        DynamicValue::Integer(i) => i.to_string(),
        DynamicValue::Float(f) => render_number(*f),
        DynamicValue::String(s) => quote_script_string(s),
        DynamicValue::Date(d) => format!("new Date({})", render_number(d.epoch_millis())),
        DynamicValue::EmptySingleton => "{}".to_string(),
        DynamicValue::Sequence(_) | DynamicValue::Map(_) => {
            let json = to_json(value, path)?;
            serde_json::to_string(&json)
                .map_err(|e| EncodeError::at(EncodeErrorKind::Custom(e.to_string()), path))?
        }
    })
}

/// Script source for `value`: a literal for a leaf, JSON text for a
/// container. Containers fail on values JSON cannot carry.
pub fn render_literal(value: &DynamicValue) -> Result<String, EncodeError> {
    render(value, &CodingPath::root())
}

/// A number as script source. Non-finite values use the `Number` constants.
pub fn render_number(number: f64) -> String {
    if number.is_nan() {
        "Number.NaN".to_string()
    } else if number == f64::INFINITY {
        "Number.POSITIVE_INFINITY".to_string()
    } else if number == f64::NEG_INFINITY {
        "Number.NEGATIVE_INFINITY".to_string()
    } else {
        number.to_string()
    }
}

/// Double-quotes `s`, backslash-escaping `\b \t \n \v \f \r " ' \`.
pub fn quote_script_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0B}' => out.push_str("\\v"),
            '\u{0C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

pub(crate) fn to_json(value: &DynamicValue, path: &CodingPath) -> Result<Value, EncodeError> {
    let non_finite = |number: f64| EncodeError::at(EncodeErrorKind::NonFiniteFloat(number), path);
    Ok(match value {
        DynamicValue::Null => Value::Null,
        DynamicValue::Bool(b) => Value::Bool(*b),
        DynamicValue::Integer(i) => Value::Number(int_number(*i)),
        DynamicValue::Float(f) => {
            Value::Number(Number::from_f64(*f).ok_or_else(|| non_finite(*f))?)
        }
        DynamicValue::String(s) => Value::String(s.clone()),
        DynamicValue::Date(d) => {
            let millis = d.epoch_millis();
            match DynamicValue::from_f64(millis) {
                DynamicValue::Integer(i) => Value::Number(int_number(i)),
                _ => Value::Number(Number::from_f64(millis).ok_or_else(|| non_finite(millis))?),
            }
        }
        DynamicValue::EmptySingleton => Value::Object(Map::new()),
        DynamicValue::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| to_json(item, &path.child(index)))
                .collect::<Result<_, _>>()?,
        ),
        DynamicValue::Map(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, item) in entries {
                out.insert(key.clone(), to_json(item, &path.child(key.as_str()))?);
            }
            Value::Object(out)
        }
    })
}

fn int_number(i: ScriptInt) -> Number {
    match i.as_u64() {
        Some(unsigned) => Number::from(unsigned),
        // Negative boxed values always fit in i64.
        None => Number::from(i.value() as i64),
    }
}
