//! Core types and traits for strata-layout
//!
//! This crate defines the foundational types shared by codecs and schemas:
//! - Value: Unified value enum for decoded data
//! - Record: Fixed-slot named-value container produced by composites
//! - Codec: Leaf codec trait (bytes <-> one value)
//! - Error: Error taxonomy for encoding, decoding and schema construction
//! - LayoutConfig: Per-call limits and policies

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod config;
pub mod error;
pub mod record;
pub mod traits;
pub mod value;

// Re-export commonly used types and traits
pub use config::{LayoutConfig, LayoutConfigError, TrailingBytes};
pub use error::{Error, ErrorKind, Result};
pub use record::Record;
pub use traits::Codec;
pub use value::Value;
