use core::fmt::{self, Display};
use std::io;

use tessera_format::{ErrorKind, ReadError};

/// Error type for CBOR deserialization.
#[derive(Debug)]
pub enum CborError {
    /// The input ended inside an item.
    UnexpectedEof {
        /// Offset at which more input was needed.
        offset: usize,
    },
    /// An item this decoder does not handle: tags, indefinite lengths and
    /// unassigned simple values.
    Unsupported {
        /// What was found.
        what: &'static str,
        /// Offset of the item's initial byte.
        offset: usize,
    },
    /// A text string is not valid UTF-8.
    InvalidUtf8 {
        /// Offset of the string's initial byte.
        offset: usize,
    },
    /// Bytes remain after the top-level item.
    TrailingBytes {
        /// Offset of the first unread byte.
        offset: usize,
    },
    /// Containers nest deeper than the decoder allows.
    TooDeep {
        /// Offset of the container that crossed the limit.
        offset: usize,
    },
    /// The input could be decoded but does not fit the target type, or an
    /// integer argument has a reserved width.
    Read(ReadError),
    /// Reading the input failed.
    Io(io::Error),
}

impl CborError {
    /// The engine error, when decoding reached the engine.
    pub fn as_read_error(&self) -> Option<&ReadError> {
        match self {
            CborError::Read(err) => Some(err),
            _ => None,
        }
    }

    /// Shorthand for the engine error's kind.
    pub fn kind(&self) -> Option<&ErrorKind> {
        self.as_read_error().map(ReadError::kind)
    }
}

impl Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CborError::UnexpectedEof { offset } => {
                write!(f, "unexpected end of input at offset {offset}")
            }
            CborError::Unsupported { what, offset } => {
                write!(f, "unsupported CBOR item at offset {offset}: {what}")
            }
            CborError::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 in text string at offset {offset}")
            }
            CborError::TrailingBytes { offset } => {
                write!(f, "trailing bytes after the top-level item at offset {offset}")
            }
            CborError::TooDeep { offset } => {
                write!(f, "nesting limit exceeded at offset {offset}")
            }
            CborError::Read(err) => write!(f, "{err}"),
            CborError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CborError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CborError::Read(err) => Some(err),
            CborError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReadError> for CborError {
    fn from(err: ReadError) -> Self {
        CborError::Read(err)
    }
}

impl From<io::Error> for CborError {
    fn from(err: io::Error) -> Self {
        CborError::Io(err)
    }
}
