//! Error types for layout encoding and decoding
//!
//! Every failure surfaced by a codec, a field or a schema is an [`Error`].
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors raised inside a named field are wrapped in [`Error::Field`] on the
//! way out, so a failure deep inside nested schemas carries the path of field
//! names that led to it. [`Error::kind`] looks through that wrapping.

use thiserror::Error;

/// Result type alias for layout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for layout encoding and decoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Two or more of the declared, codec and observed lengths disagree
    #[error("Length mismatch: declared={declared:?}, codec={codec:?}, observed={observed:?}")]
    LengthMismatch {
        /// Length declared on the field (or injected by a length link)
        declared: Option<usize>,
        /// Fixed length reported by the codec
        codec: Option<usize>,
        /// Length observed in the data
        observed: Option<usize>,
    },

    /// Malformed input for a codec (bad literal, truncated data, invalid text)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Value outside the codec's domain
    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid schema construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Write offset lies beyond the current end of the destination buffer
    #[error("Offset {offset} is out of range for a destination of {len} bytes")]
    OutOfRange {
        /// Offset the write was attempted at
        offset: usize,
        /// Length of the destination buffer at that time
        len: usize,
    },

    /// Every candidate was tried and none matched
    #[error("No candidate matched at offset {offset} ({candidates} tried)")]
    NoMatch {
        /// Offset of the failed match, relative to the enclosing scope
        offset: usize,
        /// Number of candidates tried
        candidates: usize,
    },

    /// Input ended before the required terminator was seen
    #[error("Input ended at offset {offset} without the required terminator")]
    Unterminated {
        /// Offset at which input ran out
        offset: usize,
    },

    /// Record slot does not exist
    #[error("Unknown record slot: {0}")]
    UnknownSlot(String),

    /// Error raised while processing a named field
    #[error("Field `{field}`: {source}")]
    Field {
        /// Name of the field
        field: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

/// Discriminant of an [`Error`], with field context stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::LengthMismatch`]
    LengthMismatch,
    /// See [`Error::Decode`]
    Decode,
    /// See [`Error::Encode`]
    Encode,
    /// See [`Error::Configuration`]
    Configuration,
    /// See [`Error::OutOfRange`]
    OutOfRange,
    /// See [`Error::NoMatch`]
    NoMatch,
    /// See [`Error::Unterminated`]
    Unterminated,
    /// See [`Error::UnknownSlot`]
    UnknownSlot,
}

impl Error {
    /// Create a decode error
    pub fn decode(detail: impl Into<String>) -> Self {
        Error::Decode(detail.into())
    }

    /// Create an encode error
    pub fn encode(detail: impl Into<String>) -> Self {
        Error::Encode(detail.into())
    }

    /// Create a configuration error
    pub fn config(detail: impl Into<String>) -> Self {
        Error::Configuration(detail.into())
    }

    /// Wrap this error with the name of the field it was raised in
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Error::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any field context
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Field { source, .. } = err {
            err = source.as_ref();
        }
        err
    }

    /// Kind of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Field { source, .. } => source.kind(),
            Error::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Encode(_) => ErrorKind::Encode,
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::NoMatch { .. } => ErrorKind::NoMatch,
            Error::Unterminated { .. } => ErrorKind::Unterminated,
            Error::UnknownSlot(_) => ErrorKind::UnknownSlot,
        }
    }

    /// Dotted path of field names leading to the innermost error
    ///
    /// Empty when the error was not raised inside a named field.
    pub fn field_path(&self) -> String {
        let mut parts = Vec::new();
        let mut err = self;
        while let Error::Field { field, source } = err {
            parts.push(field.as_str());
            err = source.as_ref();
        }
        parts.join(".")
    }

    /// Whether a candidate search should treat this error as "no match here"
    ///
    /// Repeated sequences and untagged variants try candidates in order and
    /// discard these failures. Schema configuration problems always propagate.
    pub fn rejects_candidate(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::UnknownSlot
        )
    }
}
