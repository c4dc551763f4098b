//! Codec error type.

use qjs_serde_buffers::BufferError;
use thiserror::Error;

/// Error type for every decode, encode and bind operation.
///
/// The first error aborts the whole call; no partial value is returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("version mismatch (have {found}, want {expected})")]
    VersionMismatch { found: u8, expected: u8 },
    #[error("unsupported tag: {0}")]
    UnsupportedTag(String),
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    #[error("atom {0} out of range")]
    AtomOutOfRange(u32),
    #[error("{0} out of range")]
    Overflow(String),
    #[error("bad typed array tag: {0}")]
    BadTypedArrayTag(u8),
    #[error("structural error: {0}")]
    StructuralError(String),
    #[error("size mismatch (declared {found} bytes, expected {expected})")]
    SizeMismatch { expected: usize, found: usize },
    #[error("stream truncated")]
    StreamTruncated,
    #[error("nesting exceeds maximum depth of {0}")]
    DepthExceeded(usize),
    #[error("field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error(transparent)]
    Io(std::io::Error),
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::EndOfBuffer { .. } => Error::StreamTruncated,
            BufferError::InvalidUtf8 => Error::InvalidUtf8,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::StreamTruncated
        } else {
            Error::Io(e)
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
