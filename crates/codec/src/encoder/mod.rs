//! Typed value -> script source.
//!
//! A value describes itself into a [`Slot`] through the serde `Serializer`
//! in [`describe`]. Nested values are described into fresh slots by
//! [`delegate`], which hands the built value back for the caller to place
//! at its index or key. The finished tree is rendered by [`render`].

mod describe;
mod render;

use js_bridge_value::{CodingPath, DynamicValue, PathSegment};
use serde::Serialize;

use crate::error::{EncodeError, EncodeErrorKind};
use crate::misuse::{Misuse, MisuseHandler};
use crate::options::EncoderOptions;

pub use render::{quote_script_string, render_literal, render_number};

use describe::Describer;

/// How a leaf produced in a scope will be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Self-contained script source: quoted strings, `new Date(..)`.
    Literal,
    /// Raw data for the single JSON renderer of an enclosing container.
    Structured,
}

/// Where a describe call writes: render mode, path and misuse handler.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    mode: RenderMode,
    path: CodingPath,
    on_misuse: MisuseHandler,
}

impl Scope {
    fn root(mode: RenderMode, options: &EncoderOptions) -> Self {
        Self {
            mode,
            path: CodingPath::root(),
            on_misuse: options.on_misuse,
        }
    }

    /// Scope of an element or field. Always structured.
    pub(crate) fn child(&self, segment: impl Into<PathSegment>) -> Self {
        Self {
            mode: RenderMode::Structured,
            path: self.path.child(segment),
            on_misuse: self.on_misuse,
        }
    }

    pub(crate) fn mode(&self) -> RenderMode {
        self.mode
    }

    pub(crate) fn path(&self) -> &CodingPath {
        &self.path
    }

    pub(crate) fn misuse(&self, misuse: Misuse) -> ! {
        (self.on_misuse)(&misuse, &self.path)
    }
}

/// The single container a value may produce.
#[derive(Debug, Default)]
pub(crate) struct Slot {
    value: Option<DynamicValue>,
}

impl Slot {
    pub(crate) fn fill(&mut self, value: DynamicValue, scope: &Scope) {
        if let Some(first) = &self.value {
            scope.misuse(Misuse::DoubleContainerRequest {
                first: first.container_kind(),
                second: value.container_kind(),
            });
        }
        self.value = Some(value);
    }

    pub(crate) fn take(self, scope: &Scope) -> Result<DynamicValue, EncodeError> {
        self.value
            .ok_or_else(|| EncodeError::at(EncodeErrorKind::NoValueProduced, scope.path()))
    }
}

/// Describes `value` in `scope` and returns what it built.
pub(crate) fn delegate<T>(value: &T, scope: &Scope) -> Result<DynamicValue, EncodeError>
where
    T: Serialize + ?Sized,
{
    let mut slot = Slot::default();
    value
        .serialize(Describer::new(&mut slot, scope))
        .map_err(|e| e.anchored(scope.path()))?;
    slot.take(scope)
}

#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Renders `value` as one self-contained script-source fragment.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, EncodeError> {
        let scope = Scope::root(RenderMode::Literal, &self.options);
        let built = delegate(value, &scope).inspect_err(log_failure)?;
        let text = render::render(&built, scope.path()).inspect_err(log_failure)?;
        tracing::trace!(kind = %built.kind(), len = text.len(), "encoded value");
        Ok(text)
    }

    /// The intermediate tree, described as if nested in a container.
    pub fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<DynamicValue, EncodeError> {
        let scope = Scope::root(RenderMode::Structured, &self.options);
        delegate(value, &scope).inspect_err(log_failure)
    }

    /// The structured rendering of `value` as a JSON value.
    pub fn encode_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<serde_json::Value, EncodeError> {
        let scope = Scope::root(RenderMode::Structured, &self.options);
        let built = delegate(value, &scope).inspect_err(log_failure)?;
        render::to_json(&built, scope.path()).inspect_err(log_failure)
    }
}

fn log_failure(err: &EncodeError) {
    tracing::debug!(error = %err, "encode failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::EncoderOptions;
    use js_bridge_value::ContainerKind;

    fn intercept(misuse: &Misuse, path: &CodingPath) -> ! {
        panic!("intercepted at {path}: {misuse}");
    }

    fn scope() -> Scope {
        Scope::root(
            RenderMode::Literal,
            &EncoderOptions {
                on_misuse: intercept,
            },
        )
    }

    #[test]
    #[should_panic(expected = "intercepted at (root): requested a sequence container after already producing a single value")]
    fn second_fill_is_fatal() {
        let scope = scope();
        let mut slot = Slot::default();
        slot.fill(DynamicValue::Bool(true), &scope);
        slot.fill(DynamicValue::Sequence(Vec::new()), &scope);
    }

    #[test]
    fn empty_slot_reports_no_value() {
        let scope = scope().child("field");
        let err = Slot::default().take(&scope).unwrap_err();
        assert_eq!(err.kind(), &EncodeErrorKind::NoValueProduced);
        assert_eq!(err.path().to_string(), "/field");
    }

    #[test]
    fn child_scopes_are_structured() {
        let root = scope();
        assert_eq!(root.mode(), RenderMode::Literal);
        let child = root.child(0usize).child("k");
        assert_eq!(child.mode(), RenderMode::Structured);
        assert_eq!(child.path().to_string(), "/0/k");
    }

    #[test]
    fn delegate_returns_built_container() {
        let built = delegate(&vec![1u8, 2], &scope()).expect("delegate");
        assert_eq!(built.container_kind(), ContainerKind::Sequence);
    }
}
