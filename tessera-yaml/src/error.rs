use core::fmt::{self, Display};
use std::io;

use tessera_format::{ErrorKind, ReadError};

/// Error type for YAML deserialization.
#[derive(Debug)]
pub enum YamlError {
    /// The input is not well-formed YAML.
    Syntax(String),
    /// An alias refers to a node that is still being composed.
    RecursiveAlias {
        /// Character offset of the alias.
        offset: usize,
    },
    /// Aliases copy more than [`MAX_ALIAS_NODES`](crate::MAX_ALIAS_NODES) nodes.
    AliasLimit {
        /// Character offset of the alias that crossed the limit.
        offset: usize,
    },
    /// The stream holds more than one document.
    MultipleDocuments {
        /// Character offset of the second document's root.
        offset: usize,
    },
    /// The input is not UTF-8.
    InvalidUtf8(core::str::Utf8Error),
    /// The document parsed but does not fit the target type.
    Read(ReadError),
    /// Reading the input failed.
    Io(io::Error),
}

impl YamlError {
    /// The engine error, when the document parsed but did not fit.
    pub fn as_read_error(&self) -> Option<&ReadError> {
        match self {
            YamlError::Read(err) => Some(err),
            _ => None,
        }
    }

    /// Shorthand for the engine error's kind.
    pub fn kind(&self) -> Option<&ErrorKind> {
        self.as_read_error().map(ReadError::kind)
    }
}

impl Display for YamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YamlError::Syntax(message) => write!(f, "invalid YAML: {message}"),
            YamlError::RecursiveAlias { offset } => {
                write!(f, "alias at offset {offset} refers to an enclosing node")
            }
            YamlError::AliasLimit { offset } => write!(
                f,
                "alias at offset {offset} expands the document past {} copied nodes",
                crate::MAX_ALIAS_NODES
            ),
            YamlError::MultipleDocuments { offset } => {
                write!(f, "expected a single document, found another at offset {offset}")
            }
            YamlError::InvalidUtf8(err) => write!(f, "input is not UTF-8: {err}"),
            YamlError::Read(err) => write!(f, "{err}"),
            YamlError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for YamlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            YamlError::InvalidUtf8(err) => Some(err),
            YamlError::Read(err) => Some(err),
            YamlError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReadError> for YamlError {
    fn from(err: ReadError) -> Self {
        YamlError::Read(err)
    }
}

impl From<io::Error> for YamlError {
    fn from(err: io::Error) -> Self {
        YamlError::Io(err)
    }
}
