//! The serde `Serializer` a value describes itself into.
//!
//! Each `serialize_*` call is one container request: scalars fill the slot
//! with a leaf, `serialize_seq`/`tuple*` with a sequence and
//! `serialize_map`/`struct*` with a map. Elements and fields are delegated
//! into fresh structured scopes.

use js_bridge_value::{DynamicValue, ScriptDate, ValueKind, ValueMap, DATE_TOKEN, URL_TOKEN};
use serde::ser::{self, Impossible, Serialize};

use super::{delegate, RenderMode, Scope, Slot};
use crate::error::{EncodeError, EncodeErrorKind};
use crate::misuse::Misuse;

pub(crate) struct Describer<'a> {
    slot: &'a mut Slot,
    scope: &'a Scope,
}

impl<'a> Describer<'a> {
    pub(crate) fn new(slot: &'a mut Slot, scope: &'a Scope) -> Self {
        Self { slot, scope }
    }

    fn leaf(self, value: DynamicValue) -> Result<(), EncodeError> {
        self.slot.fill(value, self.scope);
        Ok(())
    }

    fn float(self, number: f64) -> Result<(), EncodeError> {
        if self.scope.mode() == RenderMode::Structured && !number.is_finite() {
            return Err(EncodeError::at(
                EncodeErrorKind::NonFiniteFloat(number),
                self.scope.path(),
            ));
        }
        self.leaf(DynamicValue::Float(number))
    }

    fn date<T: Serialize + ?Sized>(self, millis: &T) -> Result<(), EncodeError> {
        let millis = delegate(millis, self.scope)?
            .as_f64()
            .ok_or_else(|| custom("date must carry a number of milliseconds", self.scope))?;
        match self.scope.mode() {
            RenderMode::Literal => self.leaf(DynamicValue::Date(ScriptDate::from_epoch_millis(millis))),
            RenderMode::Structured if !millis.is_finite() => Err(EncodeError::at(
                EncodeErrorKind::NonFiniteFloat(millis),
                self.scope.path(),
            )),
            RenderMode::Structured => self.leaf(DynamicValue::from_f64(millis)),
        }
    }

    fn url<T: Serialize + ?Sized>(self, text: &T) -> Result<(), EncodeError> {
        match delegate(text, self.scope)? {
            url @ DynamicValue::String(_) => self.leaf(url),
            _ => Err(custom("url must carry a string", self.scope)),
        }
    }
}

fn custom(message: &str, scope: &Scope) -> EncodeError {
    EncodeError::at(EncodeErrorKind::Custom(message.to_string()), scope.path())
}

fn tagged(variant: &'static str, content: DynamicValue) -> DynamicValue {
    let mut entries = ValueMap::with_capacity(1);
    entries.insert(variant.to_string(), content);
    DynamicValue::Map(entries)
}

impl<'a> ser::Serializer for Describer<'a> {
    type Ok = ();
    type Error = EncodeError;
    type SerializeSeq = SequenceDescriber<'a>;
    type SerializeTuple = SequenceDescriber<'a>;
    type SerializeTupleStruct = SequenceDescriber<'a>;
    type SerializeTupleVariant = SequenceDescriber<'a>;
    type SerializeMap = MapDescriber<'a>;
    type SerializeStruct = MapDescriber<'a>;
    type SerializeStructVariant = MapDescriber<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_u8(self, v: u8) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<(), EncodeError> {
        self.leaf(v.into())
    }

    fn serialize_f32(self, v: f32) -> Result<(), EncodeError> {
        // Widen through the shortest decimal so 0.1f32 stays 0.1.
        let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
        self.float(widened)
    }

    fn serialize_f64(self, v: f64) -> Result<(), EncodeError> {
        self.float(v)
    }

    fn serialize_char(self, v: char) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::Sequence(v.iter().copied().map(DynamicValue::from).collect()))
    }

    fn serialize_none(self) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::EmptySingleton)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<(), EncodeError> {
        self.leaf(DynamicValue::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        match name {
            DATE_TOKEN => self.date(value),
            URL_TOKEN => self.url(value),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        let content = delegate(value, &self.scope.child(variant))?;
        self.leaf(tagged(variant, content))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SequenceDescriber<'a>, EncodeError> {
        Ok(SequenceDescriber {
            slot: self.slot,
            scope: self.scope,
            items: Vec::with_capacity(len.unwrap_or(0)),
            variant: None,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SequenceDescriber<'a>, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SequenceDescriber<'a>, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SequenceDescriber<'a>, EncodeError> {
        Ok(SequenceDescriber {
            slot: self.slot,
            scope: self.scope,
            items: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapDescriber<'a>, EncodeError> {
        Ok(MapDescriber {
            slot: self.slot,
            scope: self.scope,
            entries: ValueMap::with_capacity(len.unwrap_or(0)),
            pending_key: None,
            variant: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<MapDescriber<'a>, EncodeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<MapDescriber<'a>, EncodeError> {
        Ok(MapDescriber {
            slot: self.slot,
            scope: self.scope,
            entries: ValueMap::with_capacity(len),
            pending_key: None,
            variant: Some(variant),
        })
    }
}

/// Collects elements; `end` fills the parent slot with a sequence.
pub(crate) struct SequenceDescriber<'a> {
    slot: &'a mut Slot,
    scope: &'a Scope,
    items: Vec<DynamicValue>,
    variant: Option<&'static str>,
}

impl SequenceDescriber<'_> {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        let index = self.items.len();
        let child = match self.variant {
            Some(variant) => self.scope.child(variant).child(index),
            None => self.scope.child(index),
        };
        self.items.push(delegate(value, &child)?);
        Ok(())
    }

    fn finish(self) -> Result<(), EncodeError> {
        let sequence = DynamicValue::Sequence(self.items);
        let built = match self.variant {
            Some(variant) => tagged(variant, sequence),
            None => sequence,
        };
        self.slot.fill(built, self.scope);
        Ok(())
    }
}

impl ser::SerializeSeq for SequenceDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

impl ser::SerializeTuple for SequenceDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SequenceDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SequenceDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

/// Collects entries; `end` fills the parent slot with a map.
pub(crate) struct MapDescriber<'a> {
    slot: &'a mut Slot,
    scope: &'a Scope,
    entries: ValueMap,
    pending_key: Option<String>,
    variant: Option<&'static str>,
}

impl MapDescriber<'_> {
    fn field_scope(&self, key: &str) -> Scope {
        match self.variant {
            Some(variant) => self.scope.child(variant).child(key),
            None => self.scope.child(key),
        }
    }

    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<(), EncodeError> {
        let built = delegate(value, &self.field_scope(&key))?;
        self.entries.insert(key, built);
        Ok(())
    }

    fn finish(self) -> Result<(), EncodeError> {
        if self.pending_key.is_some() {
            self.scope.misuse(Misuse::KeyWithoutValue);
        }
        let map = DynamicValue::Map(self.entries);
        let built = match self.variant {
            Some(variant) => tagged(variant, map),
            None => map,
        };
        self.slot.fill(built, self.scope);
        Ok(())
    }
}

impl ser::SerializeMap for MapDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), EncodeError> {
        if self.pending_key.is_some() {
            self.scope.misuse(Misuse::KeyWithoutValue);
        }
        let key = key.serialize(KeyDescriber { scope: self.scope })?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        let Some(key) = self.pending_key.take() else {
            self.scope.misuse(Misuse::ValueWithoutKey);
        };
        self.insert(key, value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

impl ser::SerializeStruct for MapDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for MapDescriber<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<(), EncodeError> {
        self.finish()
    }
}

/// Map keys: strings, chars, integers and bools become text.
struct KeyDescriber<'a> {
    scope: &'a Scope,
}

impl KeyDescriber<'_> {
    fn reject(&self, kind: ValueKind) -> EncodeError {
        EncodeError::at(EncodeErrorKind::KeyMustBeString(kind), self.scope.path())
    }
}

impl ser::Serializer for KeyDescriber<'_> {
    type Ok = String;
    type Error = EncodeError;
    type SerializeSeq = Impossible<String, EncodeError>;
    type SerializeTuple = Impossible<String, EncodeError>;
    type SerializeTupleStruct = Impossible<String, EncodeError>;
    type SerializeTupleVariant = Impossible<String, EncodeError>;
    type SerializeMap = Impossible<String, EncodeError>;
    type SerializeStruct = Impossible<String, EncodeError>;
    type SerializeStructVariant = Impossible<String, EncodeError>;

    fn serialize_bool(self, v: bool) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::Float))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::Float))
    }

    fn serialize_char(self, v: char) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, EncodeError> {
        Ok(v.to_owned())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::Sequence))
    }

    fn serialize_none(self) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::Null))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::Null))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::EmptySingleton))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<String, EncodeError> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<String, EncodeError> {
        match name {
            DATE_TOKEN => Err(self.reject(ValueKind::Date)),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, EncodeError> {
        Err(self.reject(ValueKind::Map))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        Err(self.reject(ValueKind::Sequence))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodeError> {
        Err(self.reject(ValueKind::Sequence))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        Err(self.reject(ValueKind::Sequence))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        Err(self.reject(ValueKind::Map))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        Err(self.reject(ValueKind::Map))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        Err(self.reject(ValueKind::Map))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        Err(self.reject(ValueKind::Map))
    }
}
