//! Field: one positioned, length-resolved codec with hooks
//!
//! A field wraps a body (a leaf codec, a nested composite, a repeated
//! sequence or a variant) and runs the decode/encode pipeline around it:
//!
//! - decode: resolve length, slice, pre-decode, body decode, post-decode
//! - encode: pre-encode, body encode, post-encode, verify length, write
//!
//! Length precedence is declared (or link-injected) length, then the body's
//! fixed length, then whatever the data turns out to be. Sources that are
//! known at the same time must agree.

use std::borrow::Cow;
use std::sync::Arc;

use strata_layout_core::{Codec, Error, LayoutConfig, Result, Value};
use tracing::trace;

use crate::composite::Composite;
use crate::frame::Frame;
use crate::hooks::{Callback, Hook, HookMode, Hooks};
use crate::sequence::RepeatedSequence;
use crate::span;
use crate::variant::Variant;

/// Whether the bytes handed to a body are exactly its extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extent {
    /// The slice is the body's full extent
    Exact,
    /// The slice runs to the end of the input; the body reports what it used
    Open,
    /// The slice is all the input there is, but the body may stop short of
    /// its end (top-level decoding with trailing bytes allowed)
    Bounded,
}

/// What a field delegates to
#[derive(Debug, Clone)]
pub(crate) enum Body {
    Leaf(Arc<dyn Codec>),
    Composite(Arc<Composite>),
    Sequence(Arc<RepeatedSequence>),
    Variant(Arc<Variant>),
}

impl Body {
    fn fixed_len(&self) -> Option<usize> {
        match self {
            Body::Leaf(codec) => codec.fixed_len(),
            Body::Composite(composite) => composite.static_len(),
            Body::Sequence(_) => None,
            Body::Variant(variant) => variant.fixed_len(),
        }
    }

    fn describe(&self) -> &str {
        match self {
            Body::Leaf(codec) => codec.name(),
            Body::Composite(_) => "composite",
            Body::Sequence(_) => "sequence",
            Body::Variant(_) => "variant",
        }
    }

    fn decode(&self, data: &[u8], extent: Extent, frame: Frame<'_>) -> Result<(Value, usize)> {
        match self {
            Body::Leaf(codec) => Ok((codec.decode(data)?, data.len())),
            Body::Composite(composite) => composite.decode_body(data, extent, frame),
            Body::Sequence(sequence) => sequence.decode_items(data, frame),
            Body::Variant(variant) => variant.decode_case(data, extent, frame),
        }
    }

    fn encode(&self, value: &Value, frame: Frame<'_>) -> Result<Vec<u8>> {
        match self {
            Body::Leaf(codec) => codec.encode(value),
            Body::Composite(composite) => composite.encode_body(value, frame),
            Body::Sequence(sequence) => sequence.encode_items(value, frame),
            Body::Variant(variant) => variant.encode_case(value, frame),
        }
    }
}

/// A codec (or nested schema) with an optional declared length and hooks
#[derive(Debug, Clone)]
pub struct Field {
    body: Body,
    length: Option<usize>,
    hooks: Hooks,
}

impl Field {
    fn with_body(body: Body) -> Self {
        Field {
            body,
            length: None,
            hooks: Hooks::default(),
        }
    }

    /// Field backed by a leaf codec
    pub fn new(codec: impl Codec + 'static) -> Self {
        Self::with_body(Body::Leaf(Arc::new(codec)))
    }

    /// Field backed by a shared leaf codec
    pub fn shared(codec: Arc<dyn Codec>) -> Self {
        Self::with_body(Body::Leaf(codec))
    }

    /// Field holding a nested composite
    ///
    /// Passing an `Arc` lets one composite appear in several places.
    pub fn nested(composite: impl Into<Arc<Composite>>) -> Self {
        Self::with_body(Body::Composite(composite.into()))
    }

    /// Field holding a repeated sequence
    pub fn sequence(sequence: impl Into<Arc<RepeatedSequence>>) -> Self {
        Self::with_body(Body::Sequence(sequence.into()))
    }

    /// Field whose body is chosen per call by a variant
    pub fn variant(variant: impl Into<Arc<Variant>>) -> Self {
        Self::with_body(Body::Variant(variant.into()))
    }

    /// Declare the field's length in bytes (builder pattern)
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Replace all four hook slots (builder pattern)
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set the pre-decode hook (builder pattern)
    pub fn on_pre_decode(mut self, cb: Callback<[u8]>) -> Self {
        self.hooks = self.hooks.with_pre_decode(cb);
        self
    }

    /// Set the post-decode hook (builder pattern)
    pub fn on_post_decode(mut self, cb: Callback<Value>) -> Self {
        self.hooks = self.hooks.with_post_decode(cb);
        self
    }

    /// Set the pre-encode hook (builder pattern)
    pub fn on_pre_encode(mut self, cb: Callback<Value>) -> Self {
        self.hooks = self.hooks.with_pre_encode(cb);
        self
    }

    /// Set the post-encode hook (builder pattern)
    pub fn on_post_encode(mut self, cb: Callback<[u8]>) -> Self {
        self.hooks = self.hooks.with_post_encode(cb);
        self
    }

    /// Register a hook by stage name
    pub fn register(&mut self, stage: &str, hook: impl Into<Hook>) -> Result<()> {
        self.hooks.register(stage, hook)
    }

    /// The declared length
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Length known without looking at any data
    pub fn fixed_len(&self) -> Option<usize> {
        self.length.or_else(|| self.body.fixed_len())
    }

    /// The hook slots
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Mutable access to the hook slots
    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Name of the codec (or kind of nested body)
    pub fn describe(&self) -> &str {
        self.body.describe()
    }

    pub(crate) fn variant_body(&self) -> Option<&Variant> {
        match &self.body {
            Body::Variant(variant) => Some(variant),
            _ => None,
        }
    }

    /// Decode this field from the start of `data` with the default configuration
    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        self.decode_with(data, &LayoutConfig::default())
    }

    /// Decode this field from the start of `data`
    ///
    /// Bytes after the field are ignored; a standalone field has no
    /// trailing-bytes policy.
    pub fn decode_with(&self, data: &[u8], config: &LayoutConfig) -> Result<Value> {
        config.validate()?;
        self.decode_at(data, 0, Frame::new(config)).map(|(value, _)| value)
    }

    /// Encode `value` with the default configuration
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        self.encode_with(value, &LayoutConfig::default())
    }

    /// Encode `value`
    pub fn encode_with(&self, value: &Value, config: &LayoutConfig) -> Result<Vec<u8>> {
        config.validate()?;
        let mut out = Vec::new();
        self.encode_into(value, &mut out, 0, Frame::new(config))?;
        Ok(out)
    }

    fn declared(&self, frame: &Frame<'_>) -> Result<Option<usize>> {
        match (self.length, frame.injected_length()) {
            (Some(declared), Some(injected)) if declared != injected => {
                Err(Error::LengthMismatch {
                    declared: Some(declared),
                    codec: self.body.fixed_len(),
                    observed: Some(injected),
                })
            }
            (declared, injected) => Ok(declared.or(injected)),
        }
    }

    /// Decode the field starting at `offset`
    ///
    /// Returns the value and the number of bytes consumed. With no known
    /// length a leaf consumes the rest of `data`, while a nested body
    /// consumes what it needs.
    pub(crate) fn decode_at(&self, data: &[u8], offset: usize, frame: Frame<'_>) -> Result<(Value, usize)> {
        let declared = self.declared(&frame)?;
        let codec = self.body.fixed_len();
        let expected = span::expected(declared, codec)?;
        let avail = span::tail(data, offset)?;
        let inner = frame.nested();

        let (value, consumed) = match expected {
            Some(len) => {
                let raw = span::take(avail, len, offset)?;
                let bytes = self.hooks.run_pre_decode(Cow::Borrowed(raw))?;
                let (value, used) = self.body.decode(&bytes, Extent::Exact, inner)?;
                if used != bytes.len() {
                    return Err(Error::LengthMismatch {
                        declared,
                        codec,
                        observed: Some(used),
                    });
                }
                (value, len)
            }
            None if matches!(self.body, Body::Leaf(_)) => {
                let bytes = self.hooks.run_pre_decode(Cow::Borrowed(avail))?;
                let (value, _) = self.body.decode(&bytes, Extent::Exact, inner)?;
                (value, avail.len())
            }
            None => {
                let hook = self.hooks.pre_decode();
                if hook.map(Callback::mode) == Some(HookMode::Replace) {
                    return Err(Error::config(format!(
                        "pre-decode replace hook needs a known length, but this {} has none",
                        self.describe()
                    )));
                }
                // the extent is only known once the body has decoded, so an
                // observer sees exactly the consumed bytes, after the fact
                let (value, used) = self.body.decode(avail, Extent::Open, inner)?;
                if let Some(cb) = hook {
                    cb.apply(Cow::Borrowed(&avail[..used]))?;
                }
                (value, used)
            }
        };

        let value = self.hooks.run_post_decode(value)?;
        trace!(target: "strata::layout", codec = self.describe(), offset, len = consumed, "Field decoded");
        Ok((value, consumed))
    }

    /// Encode `value` into `dest` at `offset`
    ///
    /// `dest` grows with zero bytes as needed; an offset beyond its current
    /// end is out of range. Returns the number of bytes written.
    pub(crate) fn encode_into(
        &self,
        value: &Value,
        dest: &mut Vec<u8>,
        offset: usize,
        frame: Frame<'_>,
    ) -> Result<usize> {
        if offset > dest.len() {
            return Err(Error::OutOfRange {
                offset,
                len: dest.len(),
            });
        }
        let declared = self.declared(&frame)?;
        let codec = self.body.fixed_len();
        span::expected(declared, codec)?;

        let value = self.hooks.run_pre_encode(Cow::Borrowed(value))?;
        let bytes = self.body.encode(&value, frame.nested())?;
        let bytes = self.hooks.run_post_encode(bytes)?;
        let len = span::verify(declared, codec, bytes.len())?;

        span::write_at(dest, offset, &bytes)?;
        trace!(target: "strata::layout", codec = self.describe(), offset, len, "Field encoded");
        Ok(len)
    }
}

impl<C: Codec + 'static> From<C> for Field {
    fn from(codec: C) -> Self {
        Field::new(codec)
    }
}
