//! Container readers: a forward-only sequence cursor, a keyed reader for
//! maps, and the enum variant reader.
//!
//! They back serde's `SeqAccess`/`MapAccess`/`EnumAccess` and are also handed
//! out by [`Decoder`](super::Decoder) for hand-written reconstruction.

use js_bridge_value::{CodingPath, DynamicValue, ValueMap};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, Visitor};

use super::reader::ValueReader;
use crate::error::DecodeError;
use crate::misuse::Misuse;
use crate::options::DecoderOptions;

/// Reads sequence elements strictly in order. Never rewinds.
#[derive(Debug)]
pub struct SequenceCursor<'de, 'o> {
    items: &'de [DynamicValue],
    index: usize,
    path: CodingPath,
    options: &'o DecoderOptions,
}

impl<'de, 'o> SequenceCursor<'de, 'o> {
    pub(crate) fn new(items: &'de [DynamicValue], path: CodingPath, options: &'o DecoderOptions) -> Self {
        Self {
            items,
            index: 0,
            path,
            options,
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.items.len()
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    /// Decodes the element under the cursor and advances past it.
    ///
    /// Past the end this is `ValueNotFound`; the cursor only advances on
    /// success.
    pub fn decode_next<T: Deserialize<'de>>(&mut self) -> Result<T, DecodeError> {
        let Some(item) = self.items.get(self.index) else {
            return Err(DecodeError::not_found(
                format!("element {} of a sequence of {}", self.index, self.items.len()),
                &self.path.child(self.index),
            ));
        };
        let decoded = T::deserialize(ValueReader::new(
            item,
            self.path.child(self.index),
            self.options,
        ))?;
        self.index += 1;
        Ok(decoded)
    }
}

impl<'de> de::SeqAccess<'de> for SequenceCursor<'de, '_> {
    type Error = DecodeError;

    fn next_element_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> Result<Option<S::Value>, DecodeError> {
        let Some(item) = self.items.get(self.index) else {
            return Ok(None);
        };
        let reader = ValueReader::new(item, self.path.child(self.index), self.options);
        let decoded = seed.deserialize(reader)?;
        self.index += 1;
        Ok(Some(decoded))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len() - self.index.min(self.items.len()))
    }
}

/// Reads a map by key, or entry by entry through `MapAccess`.
///
/// An empty record reads as a map without entries.
#[derive(Debug)]
pub struct KeyedReader<'de, 'o> {
    entries: Option<&'de ValueMap>,
    position: usize,
    pending: Option<(&'de str, &'de DynamicValue)>,
    path: CodingPath,
    options: &'o DecoderOptions,
}

impl<'de, 'o> KeyedReader<'de, 'o> {
    pub(crate) fn new(
        entries: Option<&'de ValueMap>,
        path: CodingPath,
        options: &'o DecoderOptions,
    ) -> Self {
        Self {
            entries,
            position: 0,
            pending: None,
            path,
            options,
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.map_or(0, ValueMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = &'de str> + '_ {
        self.entries
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn lookup(&self, key: &str) -> Option<&'de DynamicValue> {
        self.entries.and_then(|entries| entries.get(key))
    }

    /// Decodes the value under `key`; a missing key is `ValueNotFound`.
    pub fn decode<T: Deserialize<'de>>(&self, key: &str) -> Result<T, DecodeError> {
        let path = self.path.child(key);
        let Some(value) = self.lookup(key) else {
            return Err(DecodeError::not_found(format!("key `{key}`"), &path));
        };
        T::deserialize(ValueReader::new(value, path, self.options))
    }

    /// Like [`decode`](Self::decode), but a missing key or `null` is `None`.
    pub fn decode_optional<T: Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.lookup(key) {
            None | Some(DynamicValue::Null) => Ok(None),
            Some(value) => {
                T::deserialize(ValueReader::new(value, self.path.child(key), self.options)).map(Some)
            }
        }
    }

    /// Decodes the embedded base structure stored under the super key.
    pub fn decode_super<T: Deserialize<'de>>(&self) -> Result<T, DecodeError> {
        self.decode(&self.options.super_key)
    }
}

impl<'de> de::MapAccess<'de> for KeyedReader<'de, '_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        let Some((key, value)) = self.entries.and_then(|entries| entries.get_index(self.position))
        else {
            return Ok(None);
        };
        self.position += 1;
        self.pending = Some((key.as_str(), value));
        seed.deserialize(BorrowedStrDeserializer::new(key.as_str()))
            .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DecodeError> {
        let Some((key, value)) = self.pending.take() else {
            (self.options.on_misuse)(&Misuse::ReadValueWithoutKey, &self.path);
        };
        seed.deserialize(ValueReader::new(value, self.path.child(key), self.options))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len() - self.position.min(self.len()))
    }
}

/// An externally tagged enum: a one-entry map from variant name to content.
#[derive(Debug)]
pub(crate) struct VariantReader<'de, 'o> {
    variant: &'de str,
    content: &'de DynamicValue,
    path: CodingPath,
    options: &'o DecoderOptions,
}

impl<'de, 'o> VariantReader<'de, 'o> {
    pub(crate) fn new(
        variant: &'de str,
        content: &'de DynamicValue,
        path: CodingPath,
        options: &'o DecoderOptions,
    ) -> Self {
        Self {
            variant,
            content,
            path,
            options,
        }
    }

    fn content(self) -> ValueReader<'de, 'o> {
        ValueReader::new(self.content, self.path.child(self.variant), self.options)
    }
}

impl<'de, 'o> de::EnumAccess<'de> for VariantReader<'de, 'o> {
    type Error = DecodeError;
    type Variant = Self;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self), DecodeError> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(self.variant))?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for VariantReader<'de, '_> {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), DecodeError> {
        <()>::deserialize(self.content())
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value, DecodeError> {
        seed.deserialize(self.content())
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, DecodeError> {
        self.content().deserialize_tuple(len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.content().deserialize_struct("", fields, visitor)
    }
}
