//! [`DynamicValue`] and its container classification.

use std::fmt;

use indexmap::IndexMap;

use crate::{ScriptDate, ScriptInt};

/// Ordered string-keyed map used by [`DynamicValue::Map`].
pub type ValueMap = IndexMap<String, DynamicValue>;

/// A value as seen by the script runtime.
///
/// `Map` iterates in insertion order but compares without regard to it.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Integer(ScriptInt),
    Float(f64),
    String(String),
    Date(ScriptDate),
    /// An empty record, `{}`.
    EmptySingleton,
    Sequence(Vec<DynamicValue>),
    Map(ValueMap),
}

/// Tag of a [`DynamicValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Date,
    EmptySingleton,
    Sequence,
    Map,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Date => "date",
            Self::EmptySingleton => "empty record",
            Self::Sequence => "sequence",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three structural shapes a value decomposes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    SingleValue,
    Sequence,
    Map,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SingleValue => "single value",
            Self::Sequence => "sequence",
            Self::Map => "map",
        })
    }
}

/// Borrowed container view of a [`DynamicValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Container<'a> {
    /// A leaf; the referenced value is never a `Sequence` or `Map`.
    SingleValue(&'a DynamicValue),
    Sequence(&'a [DynamicValue]),
    Map(&'a ValueMap),
}

impl Container<'_> {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::SingleValue(_) => ContainerKind::SingleValue,
            Self::Sequence(_) => ContainerKind::Sequence,
            Self::Map(_) => ContainerKind::Map,
        }
    }
}

impl DynamicValue {
    /// Classifies a runtime number.
    ///
    /// Runtimes with a single numeric type cannot tell `2.0` from `2`, so any
    /// finite number with a zero fractional part inside the `i64` or `u64`
    /// range becomes an `Integer` leaf. Larger whole numbers stay `Float`.
    pub fn from_f64(number: f64) -> Self {
        if !number.is_finite() || number.fract() != 0.0 {
            return Self::Float(number);
        }
        // i64::MAX and u64::MAX as f64 round up to 2^63 and 2^64, hence the
        // strict upper bounds.
        if number >= i64::MIN as f64 && number < i64::MAX as f64 {
            Self::Integer(ScriptInt::from(number as i64))
        } else if number > 0.0 && number < u64::MAX as f64 {
            Self::Integer(ScriptInt::from(number as u64))
        } else {
            Self::Float(number)
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Date(_) => ValueKind::Date,
            Self::EmptySingleton => ValueKind::EmptySingleton,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Map(_) => ValueKind::Map,
        }
    }

    pub fn container(&self) -> Container<'_> {
        match self {
            Self::Sequence(items) => Container::Sequence(items),
            Self::Map(entries) => Container::Map(entries),
            leaf => Container::SingleValue(leaf),
        }
    }

    pub fn container_kind(&self) -> ContainerKind {
        self.container().kind()
    }

    pub fn is_leaf(&self) -> bool {
        self.container_kind() == ContainerKind::SingleValue
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<ScriptInt> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an `Integer` or `Float` leaf.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(i.as_f64()),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up `key` in a `Map`; `None` for every other kind.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map().and_then(|entries| entries.get(key))
    }
}

macro_rules! from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(ScriptInt::from(value))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ScriptDate> for DynamicValue {
    fn from(value: ScriptDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<DynamicValue>> FromIterator<(K, V)> for DynamicValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntWidth;

    #[test]
    fn number_heuristic_matrix() {
        assert_eq!(DynamicValue::from_f64(2.0), DynamicValue::from(2i64));
        assert_eq!(DynamicValue::from_f64(-7.0).kind(), ValueKind::Integer);
        assert_eq!(DynamicValue::from_f64(2.5), DynamicValue::Float(2.5));
        assert_eq!(DynamicValue::from_f64(1e300).kind(), ValueKind::Float);
        assert_eq!(DynamicValue::from_f64(-1e19).kind(), ValueKind::Float);
        let above_i64 = DynamicValue::from_f64(1e19).as_int();
        assert_eq!(above_i64.map(ScriptInt::width), Some(IntWidth::U64));
        assert_eq!(above_i64.and_then(ScriptInt::as_u64), Some(10_000_000_000_000_000_000));
        assert_eq!(DynamicValue::from_f64(18_446_744_073_709_551_616.0).kind(), ValueKind::Float);
        assert_eq!(DynamicValue::from_f64(f64::INFINITY).kind(), ValueKind::Float);
        assert!(matches!(DynamicValue::from_f64(f64::NAN), DynamicValue::Float(f) if f.is_nan()));
        let boxed = DynamicValue::from_f64(3.0).as_int().map(ScriptInt::width);
        assert_eq!(boxed, Some(IntWidth::I64));
    }

    #[test]
    fn container_classification() {
        let seq = DynamicValue::from(vec![1i32, 2, 3]);
        assert_eq!(seq.container_kind(), ContainerKind::Sequence);
        let map: DynamicValue = [("a", DynamicValue::Null)].into_iter().collect();
        assert_eq!(map.container_kind(), ContainerKind::Map);
        assert!(DynamicValue::EmptySingleton.is_leaf());
        assert!(DynamicValue::from("x").is_leaf());
        assert_eq!(map.get("a"), Some(&DynamicValue::Null));
        assert_eq!(seq.get("a"), None);
    }

    #[test]
    fn map_equality_ignores_order() {
        let left: DynamicValue = [("a", 1i32), ("b", 2i32)].into_iter().collect();
        let right: DynamicValue = [("b", 2i32), ("a", 1i32)].into_iter().collect();
        assert_eq!(left, right);
    }
}
