use core::fmt::{self, Display};

use tessera_format::{ErrorKind, ReadError};

/// Error type for JSON deserialization.
#[derive(Debug)]
pub enum JsonError {
    /// The input is not well-formed JSON, or reading it failed.
    Syntax(serde_json::Error),
    /// The document is valid JSON but does not fit the target type.
    Read(ReadError),
}

impl JsonError {
    /// The engine error, when the document parsed but did not fit.
    pub fn as_read_error(&self) -> Option<&ReadError> {
        match self {
            JsonError::Read(err) => Some(err),
            JsonError::Syntax(_) => None,
        }
    }

    /// Shorthand for the engine error's kind.
    pub fn kind(&self) -> Option<&ErrorKind> {
        self.as_read_error().map(ReadError::kind)
    }
}

impl Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Syntax(err) => write!(f, "invalid JSON: {err}"),
            JsonError::Read(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JsonError::Syntax(err) => Some(err),
            JsonError::Read(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(err: serde_json::Error) -> Self {
        JsonError::Syntax(err)
    }
}

impl From<ReadError> for JsonError {
    fn from(err: ReadError) -> Self {
        JsonError::Read(err)
    }
}
