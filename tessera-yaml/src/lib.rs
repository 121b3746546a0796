#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

use std::io;

use tessera_format::{Model, ReadError, deserialize_root};

mod compose;
mod emit;
mod error;
mod node;
mod reader;
mod serializer;

pub use compose::{MAX_ALIAS_NODES, parse};
pub use emit::emit;
pub use error::YamlError;
pub use node::Node;
pub use reader::YamlReader;
pub use serializer::{YamlWriter, finish, to_node, to_string, to_writer, yaml_writer};

/// Deserialize a value from a YAML document.
///
/// # Example
///
/// ```
/// use tessera::Model;
///
/// #[derive(Model, Debug, PartialEq)]
/// struct Limits {
///     max: u32,
///     label: String,
/// }
///
/// let limits: Limits = tessera_yaml::from_str("max: 10\nlabel: 10\n").unwrap();
/// assert_eq!(limits, Limits { max: 10, label: "10".into() });
/// ```
pub fn from_str<T: Model>(input: &str) -> Result<T, YamlError> {
    let node = parse(input).map_err(|err| {
        debug!(%err, "YAML parse error");
        err
    })?;
    Ok(from_node(&node)?)
}

/// Deserialize a value from UTF-8 YAML bytes.
pub fn from_slice<T: Model>(input: &[u8]) -> Result<T, YamlError> {
    let input = core::str::from_utf8(input).map_err(YamlError::InvalidUtf8)?;
    from_str(input)
}

/// Deserialize a value from an `io::Read` holding one YAML document.
pub fn from_reader<R: io::Read, T: Model>(mut reader: R) -> Result<T, YamlError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    from_slice(&input)
}

/// Read a value out of an already composed [`Node`].
pub fn from_node<T: Model>(node: &Node) -> Result<T, ReadError> {
    trace!(type_name = T::SHAPE.type_identifier, "from_node");
    deserialize_root(&YamlReader, node)
}
