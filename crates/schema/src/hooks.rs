//! Pipeline hooks
//!
//! Every field (and every composite) has four hook slots, one per pipeline
//! stage:
//!
//! ```text
//! decode:  bytes --pre_decode--> codec.decode --post_decode--> value
//! encode:  value --pre_encode--> codec.encode --post_encode--> bytes
//! ```
//!
//! Byte stages carry a [`Callback<[u8]>`](Callback), value stages a
//! [`Callback<Value>`](Callback). A callback either observes its input
//! (the input passes through unchanged) or replaces it with its output.
//! Both kinds are fallible; an error aborts the surrounding call.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use strata_layout_core::{Error, Result, Value};

/// A hook function attached to one pipeline stage
pub enum Callback<T: ?Sized + ToOwned> {
    /// Called for its side effects; the input passes through unchanged
    #[allow(clippy::type_complexity)]
    Observe(Arc<dyn Fn(&T) -> Result<()> + Send + Sync>),
    /// Called as a transform; its output replaces the input
    #[allow(clippy::type_complexity)]
    Replace(Arc<dyn Fn(T::Owned) -> Result<T::Owned> + Send + Sync>),
}

/// Whether a callback observes or replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookMode {
    /// See [`Callback::Observe`]
    Observe,
    /// See [`Callback::Replace`]
    Replace,
}

impl<T: ?Sized + ToOwned> Callback<T> {
    /// Observing callback
    pub fn observe<F>(f: F) -> Self
    where
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        Callback::Observe(Arc::new(f))
    }

    /// Replacing callback
    pub fn replace<F>(f: F) -> Self
    where
        F: Fn(T::Owned) -> Result<T::Owned> + Send + Sync + 'static,
    {
        Callback::Replace(Arc::new(f))
    }

    /// Observe or replace
    pub fn mode(&self) -> HookMode {
        match self {
            Callback::Observe(_) => HookMode::Observe,
            Callback::Replace(_) => HookMode::Replace,
        }
    }

    /// Run the callback on `input`
    ///
    /// Observing callbacks hand the input back untouched, so a borrowed
    /// input stays borrowed.
    pub fn apply<'a>(&self, input: Cow<'a, T>) -> Result<Cow<'a, T>> {
        match self {
            Callback::Observe(f) => {
                f(&*input)?;
                Ok(input)
            }
            Callback::Replace(f) => Ok(Cow::Owned(f(input.into_owned())?)),
        }
    }
}

impl<T: ?Sized + ToOwned> Clone for Callback<T> {
    fn clone(&self) -> Self {
        match self {
            Callback::Observe(f) => Callback::Observe(Arc::clone(f)),
            Callback::Replace(f) => Callback::Replace(Arc::clone(f)),
        }
    }
}

impl<T: ?Sized + ToOwned> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Observe(_) => f.write_str("Callback::Observe(..)"),
            Callback::Replace(_) => f.write_str("Callback::Replace(..)"),
        }
    }
}

/// Pipeline stage a hook runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Raw bytes, before the codec decodes them
    PreDecode,
    /// Decoded value, before it is returned
    PostDecode,
    /// Value, before the codec encodes it
    PreEncode,
    /// Encoded bytes, before they are written
    PostEncode,
}

impl Stage {
    /// All stages, in pipeline order (decode then encode)
    pub const ALL: [Stage; 4] = [
        Stage::PreDecode,
        Stage::PostDecode,
        Stage::PreEncode,
        Stage::PostEncode,
    ];

    /// Canonical stage name
    pub fn name(self) -> &'static str {
        match self {
            Stage::PreDecode => "pre_decode",
            Stage::PostDecode => "post_decode",
            Stage::PreEncode => "pre_encode",
            Stage::PostEncode => "post_encode",
        }
    }

    /// Whether the stage operates on raw bytes (as opposed to values)
    pub fn is_bytes(self) -> bool {
        matches!(self, Stage::PreDecode | Stage::PostEncode)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = Error;

    /// Accepts the canonical names and the pack/unpack spellings
    /// (`preunpack`, `postunpack`, `prepack`, `postpack`)
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pre_decode" | "preunpack" => Ok(Stage::PreDecode),
            "post_decode" | "postunpack" => Ok(Stage::PostDecode),
            "pre_encode" | "prepack" => Ok(Stage::PreEncode),
            "post_encode" | "postpack" => Ok(Stage::PostEncode),
            other => Err(Error::config(format!(
                "unknown hook stage `{}`; expected pre_decode, post_decode, pre_encode or post_encode",
                other
            ))),
        }
    }
}

/// A callback for either kind of stage
#[derive(Debug, Clone)]
pub enum Hook {
    /// Byte callback (pre-decode, post-encode)
    Bytes(Callback<[u8]>),
    /// Value callback (post-decode, pre-encode)
    Value(Callback<Value>),
}

impl From<Callback<[u8]>> for Hook {
    fn from(cb: Callback<[u8]>) -> Self {
        Hook::Bytes(cb)
    }
}

impl From<Callback<Value>> for Hook {
    fn from(cb: Callback<Value>) -> Self {
        Hook::Value(cb)
    }
}

/// The four hook slots of a field or composite
#[derive(Clone, Default)]
pub struct Hooks {
    pre_decode: Option<Callback<[u8]>>,
    post_decode: Option<Callback<Value>>,
    pre_encode: Option<Callback<Value>>,
    post_encode: Option<Callback<[u8]>>,
}

impl Hooks {
    /// Empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pre-decode hook (builder pattern)
    pub fn with_pre_decode(mut self, cb: Callback<[u8]>) -> Self {
        self.pre_decode = Some(cb);
        self
    }

    /// Set the post-decode hook (builder pattern)
    pub fn with_post_decode(mut self, cb: Callback<Value>) -> Self {
        self.post_decode = Some(cb);
        self
    }

    /// Set the pre-encode hook (builder pattern)
    pub fn with_pre_encode(mut self, cb: Callback<Value>) -> Self {
        self.pre_encode = Some(cb);
        self
    }

    /// Set the post-encode hook (builder pattern)
    pub fn with_post_encode(mut self, cb: Callback<[u8]>) -> Self {
        self.post_encode = Some(cb);
        self
    }

    /// Put `hook` in the slot for `stage`, replacing any previous hook
    ///
    /// A byte callback on a value stage, or the reverse, is a
    /// configuration error and leaves the slots untouched.
    pub fn set(&mut self, stage: Stage, hook: impl Into<Hook>) -> Result<()> {
        match (stage, hook.into()) {
            (Stage::PreDecode, Hook::Bytes(cb)) => self.pre_decode = Some(cb),
            (Stage::PostEncode, Hook::Bytes(cb)) => self.post_encode = Some(cb),
            (Stage::PostDecode, Hook::Value(cb)) => self.post_decode = Some(cb),
            (Stage::PreEncode, Hook::Value(cb)) => self.pre_encode = Some(cb),
            (stage, Hook::Bytes(_)) => {
                return Err(Error::config(format!(
                    "{} operates on values, not bytes",
                    stage
                )))
            }
            (stage, Hook::Value(_)) => {
                return Err(Error::config(format!(
                    "{} operates on bytes, not values",
                    stage
                )))
            }
        }
        Ok(())
    }

    /// [`set`](Self::set) with the stage given by name
    pub fn register(&mut self, stage: &str, hook: impl Into<Hook>) -> Result<()> {
        self.set(stage.parse()?, hook)
    }

    /// Empty the slot for `stage`
    pub fn clear(&mut self, stage: Stage) {
        match stage {
            Stage::PreDecode => self.pre_decode = None,
            Stage::PostDecode => self.post_decode = None,
            Stage::PreEncode => self.pre_encode = None,
            Stage::PostEncode => self.post_encode = None,
        }
    }

    /// Mode of the hook in `stage`, if one is set
    pub fn mode(&self, stage: Stage) -> Option<HookMode> {
        match stage {
            Stage::PreDecode => self.pre_decode.as_ref().map(Callback::mode),
            Stage::PostDecode => self.post_decode.as_ref().map(Callback::mode),
            Stage::PreEncode => self.pre_encode.as_ref().map(Callback::mode),
            Stage::PostEncode => self.post_encode.as_ref().map(Callback::mode),
        }
    }

    /// Whether a hook is set for `stage`
    pub fn is_set(&self, stage: Stage) -> bool {
        self.mode(stage).is_some()
    }

    /// Whether no slot is set
    pub fn is_empty(&self) -> bool {
        Stage::ALL.iter().all(|stage| !self.is_set(*stage))
    }

    pub(crate) fn pre_decode(&self) -> Option<&Callback<[u8]>> {
        self.pre_decode.as_ref()
    }

    pub(crate) fn run_pre_decode<'a>(&self, bytes: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>> {
        run(&self.pre_decode, bytes)
    }

    pub(crate) fn run_post_decode(&self, value: Value) -> Result<Value> {
        run(&self.post_decode, Cow::Owned(value)).map(Cow::into_owned)
    }

    pub(crate) fn run_pre_encode<'a>(&self, value: Cow<'a, Value>) -> Result<Cow<'a, Value>> {
        run(&self.pre_encode, value)
    }

    pub(crate) fn run_post_encode(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        run(&self.post_encode, Cow::Owned(bytes)).map(Cow::into_owned)
    }
}

fn run<'a, T: ?Sized + ToOwned>(slot: &Option<Callback<T>>, input: Cow<'a, T>) -> Result<Cow<'a, T>> {
    match slot {
        Some(cb) => cb.apply(input),
        None => Ok(input),
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for stage in Stage::ALL {
            if let Some(mode) = self.mode(stage) {
                map.entry(&stage.name(), &mode);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strata_layout_core::ErrorKind;

    #[test]
    fn test_observe_passes_input_through() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let cb: Callback<[u8]> = Callback::observe(move |bytes: &[u8]| {
            counter.fetch_add(bytes.len(), Ordering::SeqCst);
            Ok(())
        });
        let data = [1u8, 2, 3];
        let out = cb.apply(Cow::Borrowed(&data[..])).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(&*out, &data[..]);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_replace_adopts_output() {
        let cb: Callback<Value> = Callback::replace(|v: Value| {
            Ok(Value::UInt(v.as_u64().unwrap_or(0) * 2))
        });
        let out = cb.apply(Cow::Owned(Value::UInt(21))).unwrap();
        assert_eq!(out.into_owned(), Value::UInt(42));
        assert_eq!(cb.mode(), HookMode::Replace);
    }

    #[test]
    fn test_callback_error_propagates() {
        let cb: Callback<Value> = Callback::observe(|_: &Value| Err(Error::decode("rejected")));
        let err = cb.apply(Cow::Owned(Value::Null)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!("pre_decode".parse::<Stage>().unwrap(), Stage::PreDecode);
        assert_eq!("postpack".parse::<Stage>().unwrap(), Stage::PostEncode);
        let err = "sideways".parse::<Stage>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut hooks = Hooks::new();
        let bytes_cb: Callback<[u8]> = Callback::observe(|_: &[u8]| Ok(()));
        let err = hooks.set(Stage::PreEncode, bytes_cb).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let value_cb: Callback<Value> = Callback::observe(|_: &Value| Ok(()));
        let err = hooks.register("post_encode", value_cb).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_register_overwrites_slot() {
        let mut hooks = Hooks::new();
        hooks
            .register("post_decode", Callback::<Value>::observe(|_: &Value| Ok(())))
            .unwrap();
        assert_eq!(hooks.mode(Stage::PostDecode), Some(HookMode::Observe));

        hooks
            .register("post_decode", Callback::<Value>::replace(|_| Ok(Value::Null)))
            .unwrap();
        assert_eq!(hooks.mode(Stage::PostDecode), Some(HookMode::Replace));
        assert_eq!(hooks.run_post_decode(Value::UInt(1)).unwrap(), Value::Null);

        hooks.clear(Stage::PostDecode);
        assert!(!hooks.is_set(Stage::PostDecode));
    }

    #[test]
    fn test_unknown_stage_name() {
        let mut hooks = Hooks::new();
        let err = hooks
            .register("during", Callback::<Value>::observe(|_: &Value| Ok(())))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_slots_are_identity() {
        let hooks = Hooks::new();
        let bytes = hooks.run_post_encode(vec![9, 9]).unwrap();
        assert_eq!(bytes, vec![9, 9]);
        let value = hooks.run_pre_encode(Cow::Owned(Value::UInt(3))).unwrap();
        assert_eq!(value.into_owned(), Value::UInt(3));
    }
}
