//! Error types for the NPY format

use thiserror::Error;

use crate::types::ElementType;

/// NPY error types
#[derive(Debug, Error)]
pub enum NpyError {
    /// Input does not start with the `\x93NUMPY` magic bytes.
    #[error("invalid magic string: {0:02x?}")]
    InvalidMagic([u8; 6]),
    /// Envelope version is not supported by this decoder.
    #[error("unsupported version: {major}.{minor}")]
    UnsupportedVersion {
        /// Major version byte
        major: u8,
        /// Minor version byte
        minor: u8,
    },
    /// Header text has no dictionary literal.
    #[error("invalid header format: {0}")]
    MalformedHeader(String),
    /// A mandatory header dictionary key is absent.
    #[error("{0} not found in header")]
    MissingField(&'static str),
    /// Shape tuple contains a segment that is not a non-negative integer.
    #[error("invalid shape dimension: {0}")]
    InvalidShape(String),
    /// The dtype token is outside the supported registry.
    #[error("unsupported dtype: {0}")]
    UnsupportedDtype(String),
    /// Stream dtype differs from the element type requested by the caller.
    #[error("dtype mismatch: requested {expected}, stream holds {found}")]
    DtypeMismatch {
        /// Element type requested by the caller
        expected: ElementType,
        /// Element type recorded in the stream header
        found: ElementType,
    },
    /// Array contents are inconsistent with its metadata.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Array has too many dimensions for tabular projection.
    #[error("unsupported dimensionality: {0} dimensions (at most 2 supported)")]
    UnsupportedShape(usize),
    /// A configured limit was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// Path does not carry the expected file extension.
    #[error("expected {expected} file extension, got {path}")]
    InvalidExtension {
        /// Required extension, including the dot
        expected: &'static str,
        /// Offending path
        path: String,
    },
    /// Archive container reported an error.
    #[error("archive error: {0}")]
    Archive(String),
    /// Table sink reported an error.
    #[error("table error: {0}")]
    Table(String),
    /// Decoding or encoding a named container member failed.
    #[error("member '{name}': {source}")]
    Member {
        /// Member name inside the archive
        name: String,
        /// Underlying failure
        #[source]
        source: Box<NpyError>,
    },
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NpyError {
    /// Wrap an error with the name of the container member it came from.
    pub fn in_member(self, name: impl Into<String>) -> Self {
        NpyError::Member {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// True for malformed-stream errors (magic, version, header fields, dtype).
    pub fn is_format_error(&self) -> bool {
        match self {
            NpyError::InvalidMagic(_)
            | NpyError::UnsupportedVersion { .. }
            | NpyError::MalformedHeader(_)
            | NpyError::MissingField(_)
            | NpyError::InvalidShape(_)
            | NpyError::UnsupportedDtype(_)
            | NpyError::DtypeMismatch { .. } => true,
            NpyError::Member { source, .. } => source.is_format_error(),
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, NpyError>;
