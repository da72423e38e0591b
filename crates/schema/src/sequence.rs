//! Repeated, optionally terminated sequences of heterogeneous elements
//!
//! At each position the terminator (if any) is tried first, then every
//! candidate in declared order. The first candidate that parses commits and
//! the cursor moves past it; there is no backtracking. Ambiguity between
//! candidates is not detected: declaration order is the precedence rule.

use tracing::{debug, trace};

use strata_layout_core::{Error, LayoutConfig, Result, TrailingBytes, Value};

use crate::field::Field;
use crate::frame::Frame;

/// An indefinite-length list matched element by element against candidates
#[derive(Debug, Clone)]
pub struct RepeatedSequence {
    candidates: Vec<Field>,
    terminator: Option<Field>,
    require_terminator: bool,
}

impl RepeatedSequence {
    /// Sequence whose elements may be any of `candidates`
    pub fn new(candidates: impl IntoIterator<Item = Field>) -> Self {
        RepeatedSequence {
            candidates: candidates.into_iter().collect(),
            terminator: None,
            require_terminator: true,
        }
    }

    /// End the sequence where `terminator` matches (builder pattern)
    pub fn with_terminator(mut self, terminator: impl Into<Field>) -> Self {
        self.terminator = Some(terminator.into());
        self
    }

    /// Whether running out of input before the terminator is an error
    /// (builder pattern, default true)
    ///
    /// Only meaningful when a terminator is declared.
    pub fn require_terminator(mut self, required: bool) -> Self {
        self.require_terminator = required;
        self
    }

    /// Candidate fields, in try order
    pub fn candidates(&self) -> &[Field] {
        &self.candidates
    }

    /// The terminator, if declared
    pub fn terminator(&self) -> Option<&Field> {
        self.terminator.as_ref()
    }

    /// Whether a declared terminator must be present
    pub fn requires_terminator(&self) -> bool {
        self.require_terminator
    }

    /// Decode a whole buffer with the default configuration
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Value>> {
        self.decode_with(data, &LayoutConfig::default())
    }

    /// Decode a whole buffer
    ///
    /// Bytes left after the terminator are subject to the configuration's
    /// trailing-bytes policy.
    pub fn decode_with(&self, data: &[u8], config: &LayoutConfig) -> Result<Vec<Value>> {
        config.validate()?;
        let (items, used) = self.decode_list(data, Frame::new(config))?;
        if used < data.len() && config.trailing_bytes == TrailingBytes::Reject {
            return Err(Error::decode(format!(
                "{} trailing bytes after sequence",
                data.len() - used
            )));
        }
        Ok(items)
    }

    /// Encode `items` with the default configuration
    pub fn encode(&self, items: &[Value]) -> Result<Vec<u8>> {
        self.encode_with(items, &LayoutConfig::default())
    }

    /// Encode `items`, followed by the terminator if one is declared
    pub fn encode_with(&self, items: &[Value], config: &LayoutConfig) -> Result<Vec<u8>> {
        config.validate()?;
        self.encode_list(items, Frame::new(config))
    }

    pub(crate) fn decode_items(&self, data: &[u8], frame: Frame<'_>) -> Result<(Value, usize)> {
        let (items, used) = self.decode_list(data, frame)?;
        Ok((Value::List(items), used))
    }

    fn decode_list(&self, data: &[u8], frame: Frame<'_>) -> Result<(Vec<Value>, usize)> {
        let limit = frame.config().max_sequence_elements;
        let element = frame.isolated();
        let mut items = Vec::new();
        let mut cursor = 0;

        loop {
            if cursor == data.len() {
                if self.terminator.is_some() && self.require_terminator {
                    return Err(Error::Unterminated { offset: cursor });
                }
                break;
            }

            if let Some(terminator) = &self.terminator {
                match terminator.decode_at(data, cursor, element) {
                    Ok((_, used)) => {
                        trace!(target: "strata::layout", offset = cursor, "Sequence terminated");
                        cursor += used;
                        break;
                    }
                    Err(e) if e.rejects_candidate() => {}
                    Err(e) => return Err(e.in_field("terminator")),
                }
            }

            let (value, used) = self.match_at(data, cursor, element)?;
            items.push(value);
            cursor += used;
            if items.len() > limit {
                return Err(Error::decode(format!(
                    "sequence exceeds {} elements",
                    limit
                )));
            }
        }

        debug!(target: "strata::layout", elements = items.len(), bytes = cursor, "Sequence decoded");
        Ok((items, cursor))
    }

    fn match_at(&self, data: &[u8], cursor: usize, frame: Frame<'_>) -> Result<(Value, usize)> {
        for (idx, candidate) in self.candidates.iter().enumerate() {
            match candidate.decode_at(data, cursor, frame) {
                Ok((_, 0)) => {
                    return Err(Error::config(format!(
                        "candidate {} ({}) matched zero bytes at offset {}",
                        idx,
                        candidate.describe(),
                        cursor
                    )))
                }
                Ok(decoded) => return Ok(decoded),
                Err(e) if e.rejects_candidate() => {
                    trace!(target: "strata::layout", offset = cursor, candidate = idx, error = %e, "Sequence candidate rejected");
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::NoMatch {
            offset: cursor,
            candidates: self.candidates.len(),
        })
    }

    pub(crate) fn encode_items(&self, value: &Value, frame: Frame<'_>) -> Result<Vec<u8>> {
        match value {
            Value::List(items) => self.encode_list(items, frame),
            Value::Null => self.encode_list(&[], frame),
            other => Err(Error::encode(format!(
                "sequence expects a List, got {}",
                other.type_name()
            ))),
        }
    }

    fn encode_list(&self, items: &[Value], frame: Frame<'_>) -> Result<Vec<u8>> {
        let limit = frame.config().max_sequence_elements;
        if items.len() > limit {
            return Err(Error::encode(format!(
                "{} elements exceed the sequence limit of {}",
                items.len(),
                limit
            )));
        }

        let element = frame.isolated();
        let mut out = Vec::new();
        for item in items {
            let mark = out.len();
            let mut committed = false;
            for (idx, candidate) in self.candidates.iter().enumerate() {
                match candidate.encode_into(item, &mut out, mark, element) {
                    Ok(_) => {
                        committed = true;
                        break;
                    }
                    Err(e) if e.rejects_candidate() => {
                        out.truncate(mark);
                        trace!(target: "strata::layout", offset = mark, candidate = idx, error = %e, "Sequence candidate rejected");
                    }
                    Err(e) => return Err(e),
                }
            }
            if !committed {
                return Err(Error::NoMatch {
                    offset: mark,
                    candidates: self.candidates.len(),
                });
            }
        }

        if let Some(terminator) = &self.terminator {
            let end = out.len();
            terminator
                .encode_into(&Value::Null, &mut out, end, element)
                .map_err(|e| e.in_field("terminator"))?;
        }
        debug!(target: "strata::layout", elements = items.len(), bytes = out.len(), "Sequence encoded");
        Ok(out)
    }
}
