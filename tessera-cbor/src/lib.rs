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

pub mod decode;
pub mod encode;
mod error;
mod item;
mod reader;
mod writer;

pub use error::CborError;
pub use item::Item;
pub use reader::CborReader;
pub use writer::{CborWriter, cbor_writer, finish, to_item, to_vec, to_writer};

/// Deserialize a value from CBOR bytes holding exactly one item.
///
/// # Example
///
/// ```
/// use tessera::Model;
///
/// #[derive(Model, Debug, PartialEq)]
/// struct Pair {
///     a: u16,
///     b: i8,
/// }
///
/// // {"a": 500, "b": -3}
/// let input = [0xa2, 0x61, b'a', 0x19, 0x01, 0xf4, 0x61, b'b', 0x22];
/// let pair: Pair = tessera_cbor::from_slice(&input).unwrap();
/// assert_eq!(pair, Pair { a: 500, b: -3 });
/// ```
pub fn from_slice<T: Model>(input: &[u8]) -> Result<T, CborError> {
    let item = decode::decode(input).map_err(|err| {
        debug!(%err, "CBOR decode error");
        err
    })?;
    Ok(from_item(&item)?)
}

/// Deserialize a value from an `io::Read` holding one CBOR item.
pub fn from_reader<R: io::Read, T: Model>(mut reader: R) -> Result<T, CborError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    from_slice(&input)
}

/// Read a value out of an already decoded [`Item`].
pub fn from_item<T: Model>(item: &Item) -> Result<T, ReadError> {
    trace!(type_name = T::SHAPE.type_identifier, "from_item");
    deserialize_root(&CborReader, item)
}
