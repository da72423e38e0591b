//! Record: the named-value container produced by decoding a composite
//!
//! A record has a fixed, ordered list of slots, normally the public field
//! names of the composite that produced it. Each slot is either set or unset.
//! Iteration follows slot order and skips unset slots.
//!
//! ## Equality
//!
//! Two records are equal when the same slot names are set in both and every
//! set slot holds equal values. Slot order and unset slots do not matter, but
//! a slot set in only one of the two records makes them unequal.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-slot named-value container
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct Record {
    slots: Vec<String>,
    values: Vec<Option<Value>>,
}

/// Unchecked wire form of a [`Record`]
#[derive(Deserialize)]
struct RawRecord {
    slots: Vec<String>,
    values: Vec<Option<Value>>,
}

impl TryFrom<RawRecord> for Record {
    type Error = String;

    fn try_from(raw: RawRecord) -> std::result::Result<Self, Self::Error> {
        if raw.slots.len() != raw.values.len() {
            return Err(format!(
                "record has {} slots but {} values",
                raw.slots.len(),
                raw.values.len()
            ));
        }
        for (idx, slot) in raw.slots.iter().enumerate() {
            if raw.slots[..idx].contains(slot) {
                return Err(format!("duplicate record slot `{}`", slot));
            }
        }
        Ok(Record {
            slots: raw.slots,
            values: raw.values,
        })
    }
}

impl Record {
    /// Create an empty record with the given slots
    pub fn new<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots: Vec<String> = slots.into_iter().map(Into::into).collect();
        let values = vec![None; slots.len()];
        Record { slots, values }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot == name)
    }

    /// Slot names in order, set or not
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Whether `name` is one of this record's slots
    pub fn has_slot(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Whether the slot `name` currently holds a value
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get the value of a slot, if set
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).and_then(|idx| self.values[idx].as_ref())
    }

    /// Set a slot, returning its previous value
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSlot` if `name` is not a slot of this record.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        let idx = self
            .position(name)
            .ok_or_else(|| Error::UnknownSlot(name.to_string()))?;
        Ok(self.values[idx].replace(value.into()))
    }

    /// Set a slot (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSlot` if `name` is not a slot of this record.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Unset a slot, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.position(name).and_then(|idx| self.values[idx].take())
    }

    /// Unset every slot
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }

    /// Number of set slots
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// True when no slot is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate set slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots
            .iter()
            .zip(&self.values)
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    /// Names of set slots in slot order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }
}

/// Set-slot equality
///
/// Both records must have exactly the same slots set, with equal values.
/// This is stricter than comparing only the slots set in both: a slot set
/// on one side and unset on the other makes the records unequal.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name).map_or(false, |v| v == value))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    /// Build a record whose slots are the given names, in order, all set
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::default();
        for (name, value) in iter {
            let name = name.into();
            let value = Some(value.into());
            match record.position(&name) {
                Some(idx) => record.values[idx] = value,
                None => {
                    record.slots.push(name);
                    record.values.push(value);
                }
            }
        }
        record
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_record_is_empty() {
        let record = Record::new(["a", "b"]);
        assert!(record.is_empty());
        assert_eq!(record.slots(), &["a".to_string(), "b".to_string()]);
        assert!(record.has_slot("a"));
        assert!(!record.is_set("a"));
    }

    #[test]
    fn test_set_and_get() {
        let mut record = Record::new(["a", "b"]);
        assert_eq!(record.set("b", 2u8).unwrap(), None);
        assert_eq!(record.get("b"), Some(&Value::UInt(2)));
        assert_eq!(record.set("b", 3u8).unwrap(), Some(Value::UInt(2)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_set_unknown_slot() {
        let mut record = Record::new(["a"]);
        let err = record.set("z", 1u8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSlot);
    }

    #[test]
    fn test_iteration_follows_slot_order() {
        let mut record = Record::new(["first", "second", "third"]);
        record.set("third", 3u8).unwrap();
        record.set("first", 1u8).unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["first", "third"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut record = Record::from_iter([("a", 1u8), ("b", 2u8)]);
        assert_eq!(record.remove("a"), Some(Value::UInt(1)));
        assert!(!record.is_set("a"));
        assert!(record.has_slot("a"));
        record.clear();
        assert!(record.is_empty());
    }

    #[test]
    fn test_equality_ignores_slot_order_and_unset_slots() {
        let a = Record::from_iter([("x", 1u8), ("y", 2u8)]);
        let mut b = Record::new(["y", "z", "x"]);
        b.set("x", 1u8).unwrap();
        b.set("y", 2u8).unwrap();
        assert_eq!(a, b);

        b.set("z", 0u8).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_compares_values() {
        let a = Record::from_iter([("x", 1u8)]);
        let b = Record::from_iter([("x", 2u8)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_iter_duplicate_keys_overwrite() {
        let record = Record::from_iter([("x", 1u8), ("x", 9u8)]);
        assert_eq!(record.slots().len(), 1);
        assert_eq!(record.get("x"), Some(&Value::UInt(9)));
    }

    #[test]
    fn test_debug_shows_set_slots() {
        let record = Record::new(["a", "b"]).with("a", "hi").unwrap();
        let dbg = format!("{:?}", record);
        assert!(dbg.contains("\"a\""));
        assert!(!dbg.contains("\"b\""));
    }

    #[test]
    fn test_equality_requires_same_set_slots() {
        let full = Record::new(["a", "b"]).with("a", 1u8).unwrap().with("b", 2u8).unwrap();
        let partial = Record::new(["a", "b"]).with("a", 1u8).unwrap();
        assert_ne!(full, partial);
        assert_ne!(partial, full);
    }

    #[test]
    fn test_serde_roundtrip() {
        let record = Record::new(["a", "b"]).with("b", "text").unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.slots(), record.slots());
    }

    #[test]
    fn test_deserialize_rejects_mismatched_values() {
        let err = serde_json::from_str::<Record>(r#"{"slots":["a","b"],"values":[null]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("2 slots but 1 values"));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_slots() {
        let result = serde_json::from_str::<Record>(r#"{"slots":["a","a"],"values":[null,null]}"#);
        assert!(result.is_err());
    }
}
