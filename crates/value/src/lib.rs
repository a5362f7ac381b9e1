//! Dynamic value model for the js-bridge codec.
//!
//! [`DynamicValue`] is what the script runtime hands back and what the
//! encoder builds before rendering. [`ScriptInt`] boxes any fixed-width
//! integer without losing its range, [`CodingPath`] records where in a value
//! tree an operation is, and [`ScriptDate`] / [`ScriptUrl`] are the two leaf
//! types the codec treats specially.

mod int;
mod path;
mod special;
mod value;

pub use int::{FixedWidth, IntWidth, ScriptInt};
pub use path::{CodingPath, PathSegment};
pub use special::{DateRangeError, ScriptDate, ScriptUrl, DATE_TOKEN, URL_TOKEN};
pub use value::{Container, ContainerKind, DynamicValue, ValueKind, ValueMap};
