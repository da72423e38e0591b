//! Composite: an ordered, named record schema
//!
//! Fields are laid out back to back in the order they were pushed; push
//! order is wire order. A composite can itself be the body of a field, so
//! schemas nest.
//!
//! # Length links
//!
//! [`Composite::link_length`] ties a data field to an earlier fixed-width
//! length field. The length field leaves the public record: on decode its
//! value sizes the data field and is then dropped, on encode it is
//! synthesized from the data field's encoded size. Because the length is
//! written before the data it describes, encoding reserves the length
//! field's bytes and fills them in once the data field completes.
//!
//! # Missing values
//!
//! A slot left unset in the record being encoded is passed to its field as
//! `Null`, which padding, literals and sequences accept. Decoding leaves
//! slots unset when their field decodes to `Null`.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use strata_layout_core::{Error, LayoutConfig, Record, Result, TrailingBytes, Value};

use crate::deferred::{Deferred, Pending};
use crate::field::{Extent, Field};
use crate::frame::{Frame, Siblings};
use crate::hooks::{Callback, Hook, HookMode, Hooks, Stage};
use crate::span;

/// Ordered collection of named fields forming one record schema
#[derive(Debug, Clone, Default)]
pub struct Composite {
    fields: Vec<(String, Field)>,
    index: FxHashMap<String, usize>,
    /// Fields kept out of the public record (linked length fields)
    excluded: FxHashSet<usize>,
    /// data field -> its length field
    length_of: FxHashMap<usize, usize>,
    /// length field -> the data field it sizes
    data_of: FxHashMap<usize, usize>,
    /// Fields that some variant dispatches on
    discriminants: FxHashSet<usize>,
    hooks: Hooks,
    config: LayoutConfig,
}

impl Composite {
    /// Empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    ///
    /// Duplicate names are rejected. A field whose body is a tagged variant
    /// must name a public field pushed earlier as its discriminant.
    pub fn push(&mut self, name: impl Into<String>, field: impl Into<Field>) -> Result<()> {
        let name = name.into();
        let field = field.into();
        if self.index.contains_key(&name) {
            return Err(Error::config(format!("duplicate field `{}`", name)));
        }

        let discriminant = match field.variant_body().and_then(|v| v.discriminant()) {
            Some(discriminant) => {
                let idx = *self.index.get(discriminant).ok_or_else(|| {
                    Error::config(format!(
                        "variant `{}` dispatches on `{}`, which must be declared before it",
                        name, discriminant
                    ))
                })?;
                if self.excluded.contains(&idx) {
                    return Err(Error::config(format!(
                        "variant `{}` cannot dispatch on linked length field `{}`",
                        name, discriminant
                    )));
                }
                Some(idx)
            }
            None => None,
        };

        debug!(target: "strata::layout", field = %name, codec = field.describe(), position = self.fields.len(), "Field added");
        self.discriminants.extend(discriminant);
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push((name, field));
        Ok(())
    }

    /// [`push`](Self::push), builder style
    pub fn with(mut self, name: impl Into<String>, field: impl Into<Field>) -> Result<Self> {
        self.push(name, field)?;
        Ok(self)
    }

    /// Make field `length` carry the byte length of field `data`
    ///
    /// `length` must precede `data`, have a fixed width, and not already
    /// size another field; `data` must not already have a length field.
    /// Both must exist and differ. Violations are configuration errors
    /// raised here, not at encode or decode time.
    pub fn link_length(&mut self, data: &str, length: &str) -> Result<()> {
        let data_idx = self.position(data)?;
        let length_idx = self.position(length)?;
        if data_idx == length_idx {
            return Err(Error::config(format!("field `{}` cannot hold its own length", data)));
        }
        if length_idx > data_idx {
            return Err(Error::config(format!(
                "length field `{}` must precede data field `{}`",
                length, data
            )));
        }
        if self.length_of.contains_key(&data_idx) {
            return Err(Error::config(format!("field `{}` is already length-linked", data)));
        }
        if self.data_of.contains_key(&length_idx) {
            return Err(Error::config(format!(
                "field `{}` already holds the length of another field",
                length
            )));
        }
        if self.fields[length_idx].1.fixed_len().is_none() {
            return Err(Error::config(format!(
                "length field `{}` needs a fixed width",
                length
            )));
        }
        if self.discriminants.contains(&length_idx) {
            return Err(Error::config(format!(
                "field `{}` is a variant discriminant and must stay public",
                length
            )));
        }

        self.length_of.insert(data_idx, length_idx);
        self.data_of.insert(length_idx, data_idx);
        self.excluded.insert(length_idx);
        debug!(target: "strata::layout", data, length, "Length linked");
        Ok(())
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::config(format!("unknown field `{}`", name)))
    }

    /// Field `name`, if declared
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|idx| &self.fields[*idx].1)
    }

    /// Number of fields, linked length fields included
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All field names in wire order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Names of the fields that appear in records, in wire order
    pub fn public_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.excluded.contains(idx))
            .map(|(_, (name, _))| name.as_str())
    }

    /// Whether `name` is a public field
    pub fn is_public(&self, name: &str) -> bool {
        self.index
            .get(name)
            .is_some_and(|idx| !self.excluded.contains(idx))
    }

    /// Empty record with one slot per public field
    pub fn record(&self) -> Record {
        Record::new(self.public_names())
    }

    /// Encoded size, when every field has a fixed length
    pub fn static_len(&self) -> Option<usize> {
        if self.hooks.mode(Stage::PostEncode) == Some(HookMode::Replace)
            || self.hooks.mode(Stage::PreDecode) == Some(HookMode::Replace)
        {
            return None;
        }
        self.fields
            .iter()
            .try_fold(0usize, |total, (_, field)| Some(total + field.fixed_len()?))
    }

    /// Hooks wrapping the whole record
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Mutable access to the record-level hooks
    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Register a record-level hook by stage name
    pub fn register(&mut self, stage: &str, hook: impl Into<Hook>) -> Result<()> {
        self.hooks.register(stage, hook)
    }

    /// Configuration used by [`encode`](Self::encode) and [`decode`](Self::decode)
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Encode `record` with this composite's configuration
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        self.encode_with(record, &self.config)
    }

    /// Encode `record` with an explicit configuration
    pub fn encode_with(&self, record: &Record, config: &LayoutConfig) -> Result<Vec<u8>> {
        config.validate()?;
        let frame = Frame::new(config);
        let bytes = if self.hooks.is_set(Stage::PreEncode) {
            self.encode_body(&Value::Record(record.clone()), frame)?
        } else {
            self.encode_record(record, frame)?
        };
        if bytes.len() > config.max_message_bytes {
            return Err(Error::encode(format!(
                "encoded message of {} bytes exceeds the limit of {}",
                bytes.len(),
                config.max_message_bytes
            )));
        }
        debug!(target: "strata::layout", fields = self.fields.len(), bytes = bytes.len(), "Record encoded");
        Ok(bytes)
    }

    /// Decode a whole buffer with this composite's configuration
    pub fn decode(&self, data: &[u8]) -> Result<Record> {
        self.decode_with(data, &self.config)
    }

    /// Decode a whole buffer with an explicit configuration
    ///
    /// Input the schema does not consume is an error unless the
    /// configuration allows trailing bytes.
    pub fn decode_with(&self, data: &[u8], config: &LayoutConfig) -> Result<Record> {
        config.validate()?;
        if data.len() > config.max_message_bytes {
            return Err(Error::decode(format!(
                "input of {} bytes exceeds the limit of {}",
                data.len(),
                config.max_message_bytes
            )));
        }
        let extent = match config.trailing_bytes {
            TrailingBytes::Reject => Extent::Exact,
            TrailingBytes::Allow => Extent::Bounded,
        };
        let (value, used) = self.decode_body(data, extent, Frame::new(config))?;
        if used < data.len() && config.trailing_bytes == TrailingBytes::Reject {
            return Err(Error::decode(format!(
                "{} trailing bytes after offset {}",
                data.len() - used,
                used
            )));
        }
        debug!(target: "strata::layout", fields = self.fields.len(), bytes = used, "Record decoded");
        match value {
            Value::Record(record) => Ok(record),
            other => Err(Error::decode(format!(
                "record hook produced {} instead of a Record",
                other.type_name()
            ))),
        }
    }

    pub(crate) fn encode_body(&self, value: &Value, frame: Frame<'_>) -> Result<Vec<u8>> {
        let value = self.hooks.run_pre_encode(Cow::Borrowed(value))?;
        match value.as_ref() {
            Value::Record(record) => self.encode_record(record, frame),
            Value::Null => self.encode_record(&self.record(), frame),
            other => Err(Error::encode(format!(
                "composite expects a Record, got {}",
                other.type_name()
            ))),
        }
    }

    fn encode_record(&self, record: &Record, frame: Frame<'_>) -> Result<Vec<u8>> {
        let bytes = self.encode_fields(record, frame)?;
        self.hooks.run_post_encode(bytes)
    }

    fn encode_fields(&self, record: &Record, frame: Frame<'_>) -> Result<Vec<u8>> {
        if let Some(stray) = record.keys().find(|name| !self.is_public(name)) {
            return Err(Error::encode(format!(
                "record slot `{}` is not a public field of this schema",
                stray
            )));
        }

        let child = frame.child(Siblings::Encoding(record), None);
        let mut out = Vec::new();
        let mut deferred = Deferred::default();
        let mut cursor = 0;

        for (idx, (name, field)) in self.fields.iter().enumerate() {
            if let Some(&data_idx) = self.data_of.get(&idx) {
                // width is fixed, checked by link_length
                let width = field.fixed_len().unwrap_or(0);
                span::write_at(&mut out, cursor, &vec![0; width]).map_err(|e| e.in_field(name))?;
                deferred.defer(
                    data_idx,
                    Pending {
                        field: idx,
                        offset: cursor,
                        width,
                    },
                );
                trace!(target: "strata::layout", field = %name, offset = cursor, width, "Length reserved");
                cursor += width;
                continue;
            }

            let value = record.get(name).unwrap_or(&Value::Null);
            let len = field
                .encode_into(value, &mut out, cursor, child)
                .map_err(|e| e.in_field(name))?;
            deferred.complete(idx, len, &mut |pending: &Pending, len: usize| {
                self.write_length(pending, len, &mut out, child)
            })?;
            cursor += len;
        }

        if !deferred.is_empty() {
            return Err(Error::config(format!(
                "{} length writes never resolved",
                deferred.len()
            )));
        }
        Ok(out)
    }

    fn write_length(
        &self,
        pending: &Pending,
        len: usize,
        out: &mut Vec<u8>,
        frame: Frame<'_>,
    ) -> Result<()> {
        let (name, field) = &self.fields[pending.field];
        let mut bytes = Vec::with_capacity(pending.width);
        field
            .encode_into(&Value::from(len), &mut bytes, 0, frame)
            .map_err(|e| e.in_field(name))?;
        if bytes.len() != pending.width {
            return Err(Error::LengthMismatch {
                declared: Some(pending.width),
                codec: field.fixed_len(),
                observed: Some(bytes.len()),
            }
            .in_field(name));
        }
        out[pending.offset..pending.offset + pending.width].copy_from_slice(&bytes);
        trace!(target: "strata::layout", field = %name, offset = pending.offset, len, "Length written");
        Ok(())
    }

    pub(crate) fn decode_body(
        &self,
        data: &[u8],
        extent: Extent,
        frame: Frame<'_>,
    ) -> Result<(Value, usize)> {
        let (record, used) = match self.hooks.pre_decode() {
            Some(cb @ Callback::Replace(_)) => {
                if extent == Extent::Open {
                    return Err(Error::config(
                        "pre-decode replace hook on a composite of unknown length",
                    ));
                }
                let bytes = cb.apply(Cow::Borrowed(data))?;
                let (record, used) = self.decode_fields(&bytes, frame)?;
                if used != bytes.len() && extent == Extent::Exact {
                    return Err(Error::LengthMismatch {
                        declared: Some(bytes.len()),
                        codec: None,
                        observed: Some(used),
                    });
                }
                // replaced bytes cannot be mapped back onto the input
                (record, data.len())
            }
            Some(cb) if extent == Extent::Open => {
                // extent unknown until the fields have decoded; observe after
                let (record, used) = self.decode_fields(data, frame)?;
                cb.apply(Cow::Borrowed(&data[..used]))?;
                (record, used)
            }
            Some(cb) => {
                cb.apply(Cow::Borrowed(data))?;
                self.decode_fields(data, frame)?
            }
            None => self.decode_fields(data, frame)?,
        };
        let value = self.hooks.run_post_decode(Value::Record(record))?;
        Ok((value, used))
    }

    fn decode_fields(&self, data: &[u8], frame: Frame<'_>) -> Result<(Record, usize)> {
        let mut values: Vec<Value> = Vec::with_capacity(self.fields.len());
        let mut injected: Vec<Option<usize>> = vec![None; self.fields.len()];
        let mut cursor = 0;

        for (idx, (name, field)) in self.fields.iter().enumerate() {
            let siblings = Siblings::Decoding {
                index: &self.index,
                values: &values,
            };
            let child = frame.child(siblings, injected[idx].take());
            let (value, len) = field
                .decode_at(data, cursor, child)
                .map_err(|e| e.in_field(name))?;

            if let Some(&data_idx) = self.data_of.get(&idx) {
                let length = value.as_length().ok_or_else(|| {
                    Error::decode(format!("{:?} is not a usable length", value)).in_field(name)
                })?;
                injected[data_idx] = Some(length);
                trace!(target: "strata::layout", field = %name, length, "Length injected");
            }

            values.push(value);
            cursor += len;
        }

        let mut record = self.record();
        for (idx, ((name, _), value)) in self.fields.iter().zip(values).enumerate() {
            if self.excluded.contains(&idx) || value.is_null() {
                continue;
            }
            record.set(name, value)?;
        }
        Ok((record, cursor))
    }
}
