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

mod arena;
mod custom;
mod model;
mod reader;
mod record;
mod writer;

pub use arena::{ArrayHandle, Built, NodeId, ObjectHandle, TreeWriter};
pub use custom::CustomConstructor;
pub use model::{Model, shape_of};
pub use reader::{BasicType, FormatReader};
pub use record::{
    Record, RecordKey, duplicate_key, read_element, read_field, read_field_or_default, read_flattened, read_record,
    read_variant_tag, unexpected_variant, write_field, write_record, write_tagged,
    write_unit_variant,
};
pub use writer::{FormatWriter, Parent};

pub use tessera_core::{
    Def, ErrorKind, Field, FieldKind, IntWidth, PathSegment, ReadError, Result, Scalar,
    ScalarKind, ScalarValue, Shape, ShapeFn, SignedMagnitude, Variant, VariantKind,
};

/// Write `value` as the root of the writer's tree.
///
/// Writing is total: every in-memory value has a tree form.
pub fn serialize_root<T: Model, W: FormatWriter>(value: &T, writer: &mut W) {
    trace!(type_name = T::SHAPE.type_identifier, "serialize_root");
    value.write(writer, Parent::Root);
}

/// Read a `T` from the root node of a reader's tree.
///
/// Fails fast: the first error anywhere in the descent is returned and no
/// partial value is produced.
pub fn deserialize_root<'de, T: Model, R: FormatReader<'de>>(reader: &R, root: R::Var) -> Result<T> {
    trace!(type_name = T::SHAPE.type_identifier, "deserialize_root");
    T::read(reader, root)
}
