//! Data errors returned by the encoder and decoder.
//!
//! Errors raised by serde-generated code (a missing field, a short tuple, a
//! custom message) carry a path relative to the container that produced
//! them. The nearest describer or reader anchors them to the absolute path;
//! anchored errors pass through unchanged.

use std::fmt::Display;

use js_bridge_value::{CodingPath, IntWidth, PathSegment, ValueKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeErrorKind {
    #[error("value did not produce a container")]
    NoValueProduced,
    #[error("non-finite float {0} cannot be embedded in a structured literal")]
    NonFiniteFloat(f64),
    #[error("map key must be a string, found {0}")]
    KeyMustBeString(ValueKind),
    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind} at {path}")]
pub struct EncodeError {
    kind: EncodeErrorKind,
    path: CodingPath,
    anchored: bool,
}

impl EncodeError {
    pub(crate) fn at(kind: EncodeErrorKind, path: &CodingPath) -> Self {
        Self {
            kind,
            path: path.clone(),
            anchored: true,
        }
    }

    pub fn kind(&self) -> &EncodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub(crate) fn anchored(mut self, at: &CodingPath) -> Self {
        if !self.anchored {
            self.path = at.join(&self.path);
            self.anchored = true;
        }
        self
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self {
            kind: EncodeErrorKind::Custom(msg.to_string()),
            path: CodingPath::root(),
            anchored: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeErrorKind {
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("value not found: expected {expected}")]
    ValueNotFound { expected: String },
    #[error("integer {value} does not fit in {target}")]
    IntegerOverflow { value: i128, target: IntWidth },
    #[error("data corrupted: {0}")]
    DataCorrupted(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind} at {path}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    path: CodingPath,
    anchored: bool,
}

impl DecodeError {
    pub(crate) fn at(kind: DecodeErrorKind, path: &CodingPath) -> Self {
        Self {
            kind,
            path: path.clone(),
            anchored: true,
        }
    }

    pub(crate) fn mismatch(expected: impl Display, actual: ValueKind, path: &CodingPath) -> Self {
        Self::at(
            DecodeErrorKind::TypeMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
            path,
        )
    }

    pub(crate) fn not_found(expected: impl Display, path: &CodingPath) -> Self {
        Self::at(
            DecodeErrorKind::ValueNotFound {
                expected: expected.to_string(),
            },
            path,
        )
    }

    pub(crate) fn overflow(value: i128, target: IntWidth, path: &CodingPath) -> Self {
        Self::at(DecodeErrorKind::IntegerOverflow { value, target }, path)
    }

    pub(crate) fn corrupted(message: impl Display, path: &CodingPath) -> Self {
        Self::at(DecodeErrorKind::DataCorrupted(message.to_string()), path)
    }

    fn relative(kind: DecodeErrorKind, segment: Option<PathSegment>) -> Self {
        Self {
            kind,
            path: segment.into_iter().collect(),
            anchored: false,
        }
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::TypeMismatch { .. })
    }

    pub fn is_value_not_found(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::ValueNotFound { .. })
    }

    pub fn is_integer_overflow(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::IntegerOverflow { .. })
    }

    pub fn is_data_corrupted(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::DataCorrupted(_))
    }

    pub(crate) fn anchored(mut self, at: &CodingPath) -> Self {
        if !self.anchored {
            self.path = at.join(&self.path);
            self.anchored = true;
        }
        self
    }
}

impl serde::de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::relative(DecodeErrorKind::DataCorrupted(msg.to_string()), None)
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Self::relative(
            DecodeErrorKind::TypeMismatch {
                expected: exp.to_string(),
                actual: unexp.to_string(),
            },
            None,
        )
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        Self::relative(
            DecodeErrorKind::ValueNotFound {
                expected: exp.to_string(),
            },
            Some(PathSegment::Index(len)),
        )
    }

    fn missing_field(field: &'static str) -> Self {
        Self::relative(
            DecodeErrorKind::ValueNotFound {
                expected: format!("field `{field}`"),
            },
            Some(PathSegment::Key(field.to_owned())),
        )
    }
}
