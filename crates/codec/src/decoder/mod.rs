//! Runtime value -> typed value.
//!
//! A [`DynamicValue`] is read through the serde `Deserializer` in
//! [`reader`]; the requested type decides which leaf kinds are acceptable.
//! Raw runtime values are first classified by [`crate::classify`].

mod access;
mod reader;

use js_bridge_value::{CodingPath, DynamicValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::classify::{classify, RuntimeValue};
use crate::error::DecodeError;
use crate::options::DecoderOptions;

pub use access::{KeyedReader, SequenceCursor};

use reader::ValueReader;

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    fn reader<'de>(&self, value: &'de DynamicValue) -> ValueReader<'de, '_> {
        ValueReader::new(value, CodingPath::root(), &self.options)
    }

    /// Reconstructs a `T` from `value`. All or nothing.
    pub fn decode<'de, T: Deserialize<'de>>(&self, value: &'de DynamicValue) -> Result<T, DecodeError> {
        let decoded = T::deserialize(self.reader(value)).inspect_err(log_failure)?;
        tracing::trace!(kind = %value.kind(), "decoded value");
        Ok(decoded)
    }

    /// Classifies a raw runtime value, then decodes it.
    pub fn decode_runtime<T, R>(&self, raw: &R) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
        R: RuntimeValue + ?Sized,
    {
        let value = classify(raw).inspect_err(log_failure)?;
        self.decode(&value)
    }

    /// Decodes the base structure stored under the super key of a map.
    pub fn decode_super<'de, T: Deserialize<'de>>(&self, value: &'de DynamicValue) -> Result<T, DecodeError> {
        self.keyed(value)?.decode_super().inspect_err(log_failure)
    }

    /// A forward-only cursor over a sequence.
    pub fn sequence<'de>(&self, value: &'de DynamicValue) -> Result<SequenceCursor<'de, '_>, DecodeError> {
        self.reader(value).into_sequence().inspect_err(log_failure)
    }

    /// A keyed reader over a map or empty record.
    pub fn keyed<'de>(&self, value: &'de DynamicValue) -> Result<KeyedReader<'de, '_>, DecodeError> {
        self.reader(value).into_keyed().inspect_err(log_failure)
    }
}

fn log_failure(err: &DecodeError) {
    tracing::debug!(error = %err, "decode failed");
}
