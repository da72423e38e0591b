//! Leaf codecs for strata-layout
//!
//! Each codec converts between one [`Value`](strata_layout_core::Value) and
//! its byte representation. Codecs are immutable and `Send + Sync`, so one
//! instance can back any number of fields through an `Arc`.
//!
//! - [`Int`]: fixed-width integers, big or little endian
//! - [`Float`], [`ByteBool`]: IEEE floats and one-byte booleans
//! - [`Blob`], [`Padding`], [`Null`]: raw bytes
//! - [`Literal`]: magic numbers and sentinels
//! - [`Text`]: strings in a chosen byte encoding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blob;
pub mod float;
pub mod int;
pub mod literal;
pub mod text;

pub use blob::{Blob, Null, Padding};
pub use float::{ByteBool, Float};
pub use int::{Endian, Int, IntWidth};
pub use literal::Literal;
pub use text::{Text, TextEncoding};
