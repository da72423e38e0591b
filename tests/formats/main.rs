//! Format Tests
//!
//! End-to-end tests through the `strata_layout` facade, organized by concern:
//! - messages: realistic wire and file formats
//! - properties: proptest round trips and robustness on arbitrary input
//! - concurrency: one schema shared by many threads

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod messages;
mod properties;
