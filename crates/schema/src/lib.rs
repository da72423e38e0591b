//! Schema engine for strata-layout
//!
//! A schema is declared once and drives both directions of a binary format:
//! - [`Field`]: one codec at one position, with a resolved length and hooks
//! - [`Composite`]: ordered named fields, length links between them
//! - [`RepeatedSequence`]: indefinite lists matched against candidates
//! - [`Variant`]: tagged or untagged unions resolved per call
//!
//! Schemas are immutable while in use. Per-call state lives in a frame
//! passed down the call stack, so one schema can be shared across threads
//! and reused after a failed call without any cleanup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composite;
pub(crate) mod deferred;
pub mod field;
pub(crate) mod frame;
pub mod hooks;
pub mod sequence;
pub mod span;
pub mod variant;

pub use composite::Composite;
pub use field::Field;
pub use hooks::{Callback, Hook, HookMode, Hooks, Stage};
pub use sequence::RepeatedSequence;
pub use variant::Variant;
