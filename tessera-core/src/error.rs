use core::fmt;

/// Result alias used by every read operation.
pub type Result<T, E = ReadError> = core::result::Result<T, E>;

/// What went wrong while reading a tree into a typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required key was absent from an object node.
    FieldNotFound {
        /// The key that was looked up.
        field: String,
    },

    /// Positional access past the end of an array node.
    IndexOutOfBounds {
        /// The requested position.
        index: usize,
        /// The array's length.
        len: usize,
    },

    /// The node's kind disagrees with the requested kind.
    TypeMismatch {
        /// What the reader asked for.
        expected: &'static str,
        /// What the node actually holds.
        got: String,
    },

    /// An object key is not representable as a string.
    KeyTypeError {
        /// Description of the offending key.
        got: String,
    },

    /// A custom constructor returned an error or panicked.
    CustomConstructorFailed {
        /// The type whose constructor ran.
        type_name: &'static str,
        /// The hook's own message.
        message: String,
    },

    /// An integer was stored with a width the coercion rules do not know.
    UnknownWidth {
        /// The storage width in bytes.
        bytes: u8,
    },

    /// An enum tag matched none of the declared variants.
    UnknownVariant {
        /// The tag found in the tree.
        variant: String,
        /// The enum being read.
        type_name: &'static str,
    },

    /// A record that denies unknown fields found an undeclared key.
    UnknownField {
        /// The undeclared key.
        field: String,
        /// The record being read.
        type_name: &'static str,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FieldNotFound { field } => write!(f, "Field named '{field}' not found."),
            ErrorKind::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for array of length {len}")
            }
            ErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            ErrorKind::KeyTypeError { got } => {
                write!(f, "object keys must be strings, got {got}")
            }
            ErrorKind::CustomConstructorFailed { type_name, message } => {
                write!(f, "custom constructor for `{type_name}` failed: {message}")
            }
            ErrorKind::UnknownWidth { bytes } => {
                write!(f, "Unknown width: {bytes}-byte integers are not supported")
            }
            ErrorKind::UnknownVariant { variant, type_name } => {
                write!(f, "unknown variant `{variant}` for enum `{type_name}`")
            }
            ErrorKind::UnknownField { field, type_name } => {
                write!(f, "unknown field `{field}` in type `{type_name}`")
            }
        }
    }
}

/// One step of the location at which a read failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named child of an object.
    Field(String),
    /// A positional child of an array.
    Index(usize),
}

/// Error returned by every read, carrying the failing location.
///
/// The kind is fixed where the error is raised. While the error propagates
/// out of the recursion, each enclosing field or index prepends itself to the
/// path, so the final message names where in the tree the failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadError {
    kind: ErrorKind,
    // innermost segment first
    path: Vec<PathSegment>,
}

impl ReadError {
    /// Create an error with an empty path.
    pub const fn new(kind: ErrorKind) -> Self {
        ReadError {
            kind,
            path: Vec::new(),
        }
    }

    /// A required key was absent.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::new(ErrorKind::FieldNotFound {
            field: field.into(),
        })
    }

    /// Positional access past the end of an array.
    pub const fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds { index, len })
    }

    /// The node's kind disagrees with the requested one.
    pub fn type_mismatch(expected: &'static str, got: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected,
            got: got.into(),
        })
    }

    /// An object key is not a string.
    pub fn key_type(got: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyTypeError { got: got.into() })
    }

    /// A custom constructor failed.
    pub fn custom_constructor(type_name: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CustomConstructorFailed {
            type_name,
            message: message.into(),
        })
    }

    /// The kind of failure.
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Location of the failure, outermost segment first.
    pub fn path(&self) -> impl Iterator<Item = &PathSegment> {
        self.path.iter().rev()
    }

    /// Returns true when the failure is a missing key.
    pub const fn is_field_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::FieldNotFound { .. })
    }

    /// Record that the failure happened below the named field.
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.path.push(PathSegment::Field(name.into()));
        self
    }

    /// Record that the failure happened below the given array position.
    pub fn with_index(mut self, index: usize) -> Self {
        self.path.push(PathSegment::Index(index));
        self
    }
}

impl From<ErrorKind> for ReadError {
    fn from(kind: ErrorKind) -> Self {
        ReadError::new(kind)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.path.is_empty() {
            return Ok(());
        }
        write!(f, " (at ")?;
        for (i, segment) in self.path().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        write!(f, ")")
    }
}

impl std::error::Error for ReadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tessera_testhelpers::test]
    fn message_names_the_missing_field() {
        let err = ReadError::field_not_found("age");
        assert!(err.is_field_not_found());
        assert_eq!(err.to_string(), "Field named 'age' not found.");
    }

    #[tessera_testhelpers::test]
    fn path_is_rendered_outermost_first() {
        let err = ReadError::type_mismatch("signed integer", "string \"x\"")
            .with_field("age")
            .with_index(2)
            .with_field("people");
        assert_eq!(
            err.to_string(),
            "type mismatch: expected signed integer, got string \"x\" (at people[2].age)"
        );
        assert_eq!(
            err.path().cloned().collect::<Vec<_>>(),
            vec![
                PathSegment::Field("people".into()),
                PathSegment::Index(2),
                PathSegment::Field("age".into()),
            ]
        );
    }

    #[tessera_testhelpers::test]
    fn path_does_not_change_the_kind() {
        let err = ReadError::index_out_of_bounds(3, 2).with_field("pair");
        assert_eq!(err.kind(), &ErrorKind::IndexOutOfBounds { index: 3, len: 2 });
    }
}
