//! The serde `Deserializer` over one [`DynamicValue`].
//!
//! Every `deserialize_*` method checks the leaf kind it needs before calling
//! the visitor; integers are range-checked against the requested width.

use std::fmt::Display;

use js_bridge_value::{
    CodingPath, DynamicValue, FixedWidth, ScriptUrl, ValueKind, DATE_TOKEN, URL_TOKEN,
};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, Visitor};

use super::access::{KeyedReader, SequenceCursor, VariantReader};
use crate::error::{DecodeError, DecodeErrorKind};
use crate::options::DecoderOptions;

pub(crate) struct ValueReader<'de, 'o> {
    value: &'de DynamicValue,
    path: CodingPath,
    options: &'o DecoderOptions,
}

impl<'de, 'o> ValueReader<'de, 'o> {
    pub(crate) fn new(value: &'de DynamicValue, path: CodingPath, options: &'o DecoderOptions) -> Self {
        Self {
            value,
            path,
            options,
        }
    }

    fn mismatch(&self, expected: impl Display) -> DecodeError {
        DecodeError::mismatch(expected, self.value.kind(), &self.path)
    }

    fn int<T: FixedWidth>(&self) -> Result<T, DecodeError> {
        match self.value {
            DynamicValue::Integer(i) => i
                .narrow::<T>()
                .ok_or_else(|| DecodeError::overflow(i.value(), T::WIDTH, &self.path)),
            // Whole numbers too large for any boxed width stay float leaves.
            DynamicValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                let value = *f as i128;
                T::try_from(value).map_err(|_| DecodeError::overflow(value, T::WIDTH, &self.path))
            }
            _ => Err(self.mismatch(T::WIDTH)),
        }
    }

    fn float(&self) -> Result<f64, DecodeError> {
        match self.value {
            DynamicValue::Integer(i) => Ok(i.as_f64()),
            DynamicValue::Float(f) => Ok(*f),
            _ => Err(self.mismatch("float")),
        }
    }

    fn str(&self) -> Result<&'de str, DecodeError> {
        match self.value {
            DynamicValue::String(s) => Ok(s),
            _ => Err(self.mismatch(ValueKind::String)),
        }
    }

    fn keyed(self, expected: &str) -> Result<KeyedReader<'de, 'o>, DecodeError> {
        match self.value {
            DynamicValue::Map(entries) => Ok(KeyedReader::new(Some(entries), self.path, self.options)),
            DynamicValue::EmptySingleton => Ok(KeyedReader::new(None, self.path, self.options)),
            _ => Err(self.mismatch(expected)),
        }
    }

    fn sequence(self) -> Result<SequenceCursor<'de, 'o>, DecodeError> {
        match self.value {
            DynamicValue::Sequence(items) => Ok(SequenceCursor::new(items, self.path, self.options)),
            _ => Err(self.mismatch(ValueKind::Sequence)),
        }
    }

    pub(crate) fn into_keyed(self) -> Result<KeyedReader<'de, 'o>, DecodeError> {
        self.keyed("map")
    }

    pub(crate) fn into_sequence(self) -> Result<SequenceCursor<'de, 'o>, DecodeError> {
        self.sequence()
    }

    fn date<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let millis = match self.value {
            DynamicValue::Date(d) => d.epoch_millis(),
            DynamicValue::Integer(i) => i.as_f64(),
            DynamicValue::Float(f) => *f,
            _ => return Err(self.mismatch(ValueKind::Date)),
        };
        visitor
            .visit_f64(millis)
            .map_err(|e: DecodeError| e.anchored(&self.path))
    }

    fn url<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let text = self.str().map_err(|_| self.mismatch("URL"))?;
        if ScriptUrl::parse(text).is_err() {
            return Err(DecodeError::at(
                DecodeErrorKind::TypeMismatch {
                    expected: "URL".to_string(),
                    actual: format!("malformed URL {text:?}"),
                },
                &self.path,
            ));
        }
        visitor
            .visit_borrowed_str(text)
            .map_err(|e: DecodeError| e.anchored(&self.path))
    }
}

macro_rules! deserialize_int {
    ($($method:ident => $visit:ident : $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                let v = self.int::<$ty>()?;
                visitor.$visit(v).map_err(|e: DecodeError| e.anchored(&self.path))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueReader<'de, '_> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let value = self.value;
        let result = match value {
            DynamicValue::Null => visitor.visit_unit(),
            DynamicValue::Bool(b) => visitor.visit_bool(*b),
            DynamicValue::Integer(i) => match (i.as_i64(), i.as_u64()) {
                (Some(signed), _) => visitor.visit_i64(signed),
                (None, Some(unsigned)) => visitor.visit_u64(unsigned),
                (None, None) => visitor.visit_i128(i.value()),
            },
            DynamicValue::Float(f) => visitor.visit_f64(*f),
            DynamicValue::String(s) => visitor.visit_borrowed_str(s),
            DynamicValue::Date(d) => visitor.visit_f64(d.epoch_millis()),
            DynamicValue::EmptySingleton | DynamicValue::Map(_) => {
                visitor.visit_map(self.into_keyed()?)
            }
            DynamicValue::Sequence(_) => visitor.visit_seq(self.into_sequence()?),
        };
        result.map_err(|e: DecodeError| e.anchored(&path))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            DynamicValue::Bool(b) => visitor
                .visit_bool(*b)
                .map_err(|e: DecodeError| e.anchored(&self.path)),
            _ => Err(self.mismatch(ValueKind::Bool)),
        }
    }

    deserialize_int! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let v = self.float()? as f32;
        visitor.visit_f32(v).map_err(|e: DecodeError| e.anchored(&self.path))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let v = self.float()?;
        visitor.visit_f64(v).map_err(|e: DecodeError| e.anchored(&self.path))
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let text = self.str().map_err(|_| self.mismatch("char"))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor
                .visit_char(ch)
                .map_err(|e: DecodeError| e.anchored(&self.path)),
            _ => Err(DecodeError::at(
                DecodeErrorKind::TypeMismatch {
                    expected: "char".to_string(),
                    actual: format!("string of {} characters", text.chars().count()),
                },
                &self.path,
            )),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let text = self.str()?;
        visitor
            .visit_borrowed_str(text)
            .map_err(|e: DecodeError| e.anchored(&self.path))
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let value = self.value;
        let result = match value {
            DynamicValue::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        };
        result.map_err(|e: DecodeError| e.anchored(&path))
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        // An empty record comes back from the runtime as an empty map.
        let is_unit = match self.value {
            DynamicValue::Null | DynamicValue::EmptySingleton => true,
            DynamicValue::Map(entries) => entries.is_empty(),
            _ => false,
        };
        if !is_unit {
            return Err(self.mismatch(ValueKind::Null));
        }
        visitor
            .visit_unit()
            .map_err(|e: DecodeError| e.anchored(&self.path))
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        match name {
            DATE_TOKEN => self.date(visitor),
            URL_TOKEN => self.url(visitor),
            _ => {
                let path = self.path.clone();
                visitor
                    .visit_newtype_struct(self)
                    .map_err(|e: DecodeError| e.anchored(&path))
            }
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let cursor = self.into_sequence()?;
        visitor.visit_seq(cursor).map_err(|e: DecodeError| e.anchored(&path))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let keyed = self.into_keyed()?;
        visitor.visit_map(keyed).map_err(|e: DecodeError| e.anchored(&path))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let keyed = self.keyed(&format!("map for struct {name}"))?;
        visitor.visit_map(keyed).map_err(|e: DecodeError| e.anchored(&path))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let value = self.value;
        let result = match value {
            DynamicValue::String(s) => {
                visitor.visit_enum(BorrowedStrDeserializer::<DecodeError>::new(s))
            }
            DynamicValue::Map(entries) if entries.len() == 1 => {
                let Some((variant, content)) = entries.get_index(0) else {
                    return Err(self.mismatch(format!("enum {name}")));
                };
                let reader = VariantReader::new(variant, content, path.clone(), self.options);
                visitor.visit_enum(reader)
            }
            _ => return Err(self.mismatch(format!("enum {name}"))),
        };
        result.map_err(|e: DecodeError| e.anchored(&path))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }
}
