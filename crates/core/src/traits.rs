//! Leaf codec trait definition
//!
//! A leaf codec is a stateless converter between a byte slice and a single
//! [`Value`]. Fields wrap leaf codecs and add positioning, length resolution
//! and hooks; the codec itself never sees offsets.

use crate::error::Result;
use crate::value::Value;
use std::fmt;

/// Leaf codec trait.
///
/// All bytes of a leaf field pass through its codec. Implementations must be
/// pure: the same input always produces the same output, and no state is
/// kept between calls.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync` so one codec can back many fields and one
/// schema can be used from multiple threads at once.
///
/// # Length
///
/// A codec either has a fixed length, in which case `decode` is only ever
/// handed slices of exactly that length and `encode` must produce exactly
/// that many bytes, or it reports `None` and the length is taken from the
/// field or the data.
pub trait Codec: Send + Sync + fmt::Debug {
    /// Short codec identifier used in error messages and logs
    fn name(&self) -> &str;

    /// Fixed encoded length in bytes, if any
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    /// Decode a value from exactly the bytes of one field
    ///
    /// # Errors
    ///
    /// Returns `Error::Decode` when the bytes are malformed for this codec.
    fn decode(&self, data: &[u8]) -> Result<Value>;

    /// Encode a value to bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::Encode` when the value is outside the codec's domain.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;
}
