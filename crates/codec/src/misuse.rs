//! Protocol misuse: a broken `Serialize`/`Deserialize` impl, not bad data.
//!
//! Misuse never comes back as a `Result`. It goes to the handler configured
//! in the options, which must not return.

use std::fmt;

use js_bridge_value::{CodingPath, ContainerKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Misuse {
    /// A value filled its slot twice.
    DoubleContainerRequest {
        first: ContainerKind,
        second: ContainerKind,
    },
    /// A map value was written before its key.
    ValueWithoutKey,
    /// A map key was left without a value.
    KeyWithoutValue,
    /// A map value was read before its key.
    ReadValueWithoutKey,
}

impl fmt::Display for Misuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleContainerRequest { first, second } => write!(
                f,
                "requested a {second} container after already producing a {first}"
            ),
            Self::ValueWithoutKey => f.write_str("map value written before its key"),
            Self::KeyWithoutValue => f.write_str("map key written without a value"),
            Self::ReadValueWithoutKey => f.write_str("map value read before its key"),
        }
    }
}

/// Called on misuse with the offending path. Must diverge.
pub type MisuseHandler = fn(&Misuse, &CodingPath) -> !;

/// Default [`MisuseHandler`]: logs and panics.
pub fn panic_on_misuse(misuse: &Misuse, path: &CodingPath) -> ! {
    tracing::error!(%misuse, %path, "js-bridge protocol misuse");
    panic!("js-bridge protocol misuse at {path}: {misuse}");
}
