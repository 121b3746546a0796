#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod error;
mod scalar;
mod shape;

pub use error::{ErrorKind, PathSegment, ReadError, Result};
pub use scalar::{IntWidth, Scalar, ScalarKind, ScalarValue, SignedMagnitude};
pub use shape::{Def, Field, FieldKind, Shape, ShapeFn, Variant, VariantKind};
