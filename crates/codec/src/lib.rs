//! Bidirectional codec between typed Rust values and JavaScript runtime
//! values.
//!
//! Any `Serialize` type can be turned into a script-source fragment ready to
//! splice into an argument position, and any `Deserialize` type can be
//! reconstructed from what the runtime returns, with strict kind checks,
//! range-checked integers and path-tracked errors.
//!
//! ```
//! use js_bridge_codec::{decode, encode, DynamicValue};
//!
//! assert_eq!(encode("O'Brien").unwrap(), r#""O\'Brien""#);
//! assert_eq!(encode(&["O'Brien"]).unwrap(), r#"["O'Brien"]"#);
//! assert_eq!(encode(&f64::NAN).unwrap(), "Number.NaN");
//!
//! let value = DynamicValue::from(500i64);
//! assert!(decode::<i8>(&value).unwrap_err().is_integer_overflow());
//! ```

pub mod classify;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod misuse;
pub mod options;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use classify::{classify, RuntimeValue, RuntimeView};
pub use decoder::{Decoder, KeyedReader, SequenceCursor};
pub use encoder::{Encoder, RenderMode};
pub use error::{DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind};
pub use js_bridge_value::{
    CodingPath, Container, ContainerKind, DynamicValue, IntWidth, PathSegment, ScriptDate,
    ScriptInt, ScriptUrl, ValueKind, ValueMap,
};
pub use misuse::{panic_on_misuse, Misuse, MisuseHandler};
pub use options::{DecoderOptions, EncoderOptions, SUPER_KEY};

/// Encodes `value` as a self-contained script-source fragment.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    Encoder::new().encode(value)
}

/// Encodes `value` as the JSON value a structured container would embed.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, EncodeError> {
    Encoder::new().encode_json(value)
}

/// Decodes a `T` from a dynamic runtime value.
pub fn decode<'de, T: Deserialize<'de>>(value: &'de DynamicValue) -> Result<T, DecodeError> {
    Decoder::new().decode(value)
}

/// Classifies a raw runtime value and decodes a `T` from it.
pub fn decode_runtime<T, R>(raw: &R) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    R: RuntimeValue + ?Sized,
{
    Decoder::new().decode_runtime(raw)
}
