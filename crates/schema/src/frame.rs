//! Per-call activation frame
//!
//! Schemas hold no per-call state. Everything a traversal needs beyond the
//! schema itself (configuration, a length injected by a length link, the
//! values of sibling fields a variant dispatches on) travels down the call
//! stack in a [`Frame`]. Frames are `Copy`; each level derives the frame for
//! its children instead of mutating a shared one, so nothing has to be
//! restored when a call returns or fails.

use rustc_hash::FxHashMap;
use strata_layout_core::{Error, LayoutConfig, Record, Result, Value};

static NULL: Value = Value::Null;

/// Context for one encode or decode traversal
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame<'a> {
    config: &'a LayoutConfig,
    siblings: Siblings<'a>,
    length: Option<usize>,
}

/// Values of the fields that share a composite with the current field
#[derive(Debug, Clone, Copy)]
pub(crate) enum Siblings<'a> {
    /// Not inside a composite (top level, or a sequence element)
    Empty,
    /// Encoding: the record being encoded
    Encoding(&'a Record),
    /// Decoding: values decoded so far, indexed by field position
    Decoding {
        index: &'a FxHashMap<String, usize>,
        values: &'a [Value],
    },
}

impl<'a> Frame<'a> {
    /// Root frame for a top-level call
    pub(crate) fn new(config: &'a LayoutConfig) -> Self {
        Frame {
            config,
            siblings: Siblings::Empty,
            length: None,
        }
    }

    /// Configuration in effect for this call
    pub(crate) fn config(&self) -> &'a LayoutConfig {
        self.config
    }

    /// Length injected by a length link, if any
    pub(crate) fn injected_length(&self) -> Option<usize> {
        self.length
    }

    /// Frame for the body of the current field: same scope, no injected length
    pub(crate) fn nested(self) -> Self {
        Frame {
            length: None,
            ..self
        }
    }

    /// Frame for a sequence element: no scope, no injected length
    pub(crate) fn isolated(self) -> Self {
        Frame {
            config: self.config,
            siblings: Siblings::Empty,
            length: None,
        }
    }

    /// Frame for a child of a composite
    pub(crate) fn child<'b>(&self, siblings: Siblings<'b>, length: Option<usize>) -> Frame<'b>
    where
        'a: 'b,
    {
        Frame {
            config: self.config,
            siblings,
            length,
        }
    }

    /// Value of the sibling field `name`
    ///
    /// While encoding, a slot the record leaves unset reads as `Null`.
    pub(crate) fn sibling(&self, name: &str) -> Result<&'a Value> {
        match self.siblings {
            Siblings::Encoding(record) => Ok(record.get(name).unwrap_or(&NULL)),
            Siblings::Decoding { index, values } => index
                .get(name)
                .and_then(|idx| values.get(*idx))
                .ok_or_else(|| not_in_scope(name)),
            _ => Err(not_in_scope(name)),
        }
    }
}

fn not_in_scope(name: &str) -> Error {
    Error::config(format!("discriminant `{}` is not in scope", name))
}
