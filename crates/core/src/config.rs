//! Layout configuration.
//!
//! This module provides the per-call limits and policies applied while
//! encoding and decoding. A configuration is handed to the top-level call
//! and inherited by every nested schema.

use serde::{Deserialize, Serialize};

/// What a top-level decode does with input the schema did not consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailingBytes {
    /// Fail the decode
    #[default]
    Reject,
    /// Ignore the leftover bytes
    Allow,
}

/// Layout configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Policy for bytes left over after a top-level decode (default: Reject).
    pub trailing_bytes: TrailingBytes,

    /// Maximum number of elements in one repeated sequence (default: 65536).
    pub max_sequence_elements: usize,

    /// Maximum size of a top-level message in bytes (default: 64MB).
    ///
    /// Applies to decode input and encode output.
    pub max_message_bytes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            trailing_bytes: TrailingBytes::Reject,
            max_sequence_elements: 64 * 1024,
            max_message_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl LayoutConfig {
    /// Create a new layout configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailing bytes policy (builder pattern).
    pub fn with_trailing_bytes(mut self, policy: TrailingBytes) -> Self {
        self.trailing_bytes = policy;
        self
    }

    /// Set the sequence element limit (builder pattern).
    pub fn with_max_sequence_elements(mut self, max: usize) -> Self {
        self.max_sequence_elements = max;
        self
    }

    /// Set the message size limit (builder pattern).
    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        if self.max_sequence_elements == 0 {
            return Err(LayoutConfigError::ZeroSequenceLimit);
        }
        if self.max_message_bytes == 0 {
            return Err(LayoutConfigError::ZeroMessageLimit);
        }
        Ok(())
    }
}

/// Layout configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutConfigError {
    /// Sequence element limit is zero.
    #[error("max_sequence_elements must be at least 1")]
    ZeroSequenceLimit,

    /// Message size limit is zero.
    #[error("max_message_bytes must be at least 1")]
    ZeroMessageLimit,
}

impl From<LayoutConfigError> for crate::error::Error {
    fn from(e: LayoutConfigError) -> Self {
        crate::error::Error::Configuration(e.to_string())
    }
}
