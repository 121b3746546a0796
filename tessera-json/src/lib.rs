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

mod error;
mod reader;
mod serializer;

pub use error::JsonError;
pub use reader::JsonReader;
pub use serializer::{
    JsonWriter, SerializeOptions, finish, json_writer, to_string, to_string_pretty,
    to_string_with_options, to_value, to_vec, to_vec_with_options, to_writer,
    to_writer_with_options,
};

pub use serde_json::Value;

/// Deserialize a value from a JSON string.
///
/// # Example
///
/// ```
/// use tessera::Model;
///
/// #[derive(Model, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let point: Point = tessera_json::from_str(r#"{"y": 20, "x": 10}"#).unwrap();
/// assert_eq!(point, Point { x: 10, y: 20 });
/// ```
pub fn from_str<T: Model>(input: &str) -> Result<T, JsonError> {
    let value: Value = serde_json::from_str(input).map_err(|err| {
        debug!(%err, "JSON syntax error");
        JsonError::Syntax(err)
    })?;
    Ok(from_value(&value)?)
}

/// Deserialize a value from JSON bytes.
pub fn from_slice<T: Model>(input: &[u8]) -> Result<T, JsonError> {
    let value: Value = serde_json::from_slice(input)?;
    Ok(from_value(&value)?)
}

/// Deserialize a value from an `io::Read` holding one JSON document.
pub fn from_reader<R: io::Read, T: Model>(reader: R) -> Result<T, JsonError> {
    let value: Value = serde_json::from_reader(reader)?;
    Ok(from_value(&value)?)
}

/// Read a value out of an already parsed `serde_json::Value`.
pub fn from_value<T: Model>(value: &Value) -> Result<T, ReadError> {
    trace!(type_name = T::SHAPE.type_identifier, "from_value");
    deserialize_root(&JsonReader, value)
}
