//! strata-layout - Schema-driven binary layouts
//!
//! Declare a binary format once, as a tree of fields, and use the same
//! declaration to decode bytes into records and to encode records back
//! into bytes.
//!
//! # Quick Start
//!
//! ```
//! use strata_layout::{Blob, Composite, Int};
//!
//! let mut schema = Composite::new();
//! schema.push("length", Int::u32_be())?;
//! schema.push("body", Blob::new())?;
//! schema.link_length("body", "length")?;
//!
//! let record = schema.record().with("body", b"hello")?;
//! let bytes = schema.encode(&record)?;
//! assert_eq!(bytes, b"\x00\x00\x00\x05hello");
//! assert_eq!(schema.decode(&bytes)?, record);
//! # Ok::<(), strata_layout::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `strata-layout-core`: values, records, the [`Codec`] trait, errors, config
//! - `strata-layout-codecs`: leaf codecs (integers, blobs, literals, text, ...)
//! - `strata-layout-schema`: fields, composites, sequences and variants
//!
//! Schemas are immutable while in use and may be shared across threads.

pub use strata_layout_codecs::{
    Blob, ByteBool, Endian, Float, Int, IntWidth, Literal, Null, Padding, Text, TextEncoding,
};
pub use strata_layout_core::{
    Codec, Error, ErrorKind, LayoutConfig, LayoutConfigError, Record, Result, TrailingBytes,
    Value,
};
pub use strata_layout_schema::{
    Callback, Composite, Field, Hook, HookMode, Hooks, RepeatedSequence, Stage, Variant,
};
