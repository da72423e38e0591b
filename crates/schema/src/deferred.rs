//! Deferred length writes
//!
//! While encoding, a linked length field is reached before the data whose
//! size it records. The composite reserves the length field's bytes and
//! parks a [`Pending`] write under the data field. When the data field
//! completes, its pending writes run in registration order. Each write
//! completes the length field it fills, which may release writes parked
//! under that field in turn (length chains), so completion propagates
//! depth-first through the table.

use rustc_hash::FxHashMap;
use strata_layout_core::Result;

/// A reserved byte range waiting for the length of another field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pending {
    /// Position of the length field in its composite
    pub field: usize,
    /// Offset of the reserved bytes
    pub offset: usize,
    /// Number of reserved bytes
    pub width: usize,
}

/// Pending writes keyed by the position of the field they wait on
#[derive(Debug, Default)]
pub(crate) struct Deferred {
    waiting: FxHashMap<usize, Vec<Pending>>,
}

impl Deferred {
    /// Park `pending` until field `target` completes
    pub fn defer(&mut self, target: usize, pending: Pending) {
        self.waiting.entry(target).or_default().push(pending);
    }

    /// Field `target` completed with `len` bytes: run everything waiting on it
    ///
    /// `write` receives each pending write and the length to record.
    pub fn complete<F>(&mut self, target: usize, len: usize, write: &mut F) -> Result<()>
    where
        F: FnMut(&Pending, usize) -> Result<()>,
    {
        let Some(ready) = self.waiting.remove(&target) else {
            return Ok(());
        };
        for pending in ready {
            write(&pending, len)?;
            self.complete(pending.field, pending.width, write)?;
        }
        Ok(())
    }

    /// Number of pending writes
    pub fn len(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
