//! Encoder and decoder options.

use crate::misuse::{panic_on_misuse, MisuseHandler};

/// Key under which an embedded base structure is stored.
pub const SUPER_KEY: &str = "super";

#[derive(Debug, Clone, Copy)]
pub struct EncoderOptions {
    pub on_misuse: MisuseHandler,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            on_misuse: panic_on_misuse,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecoderOptions {
    pub on_misuse: MisuseHandler,
    /// Key read by `decode_super`.
    pub super_key: String,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            on_misuse: panic_on_misuse,
            super_key: SUPER_KEY.to_owned(),
        }
    }
}
