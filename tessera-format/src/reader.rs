use crate::{CustomConstructor, Result, Scalar, ScalarKind, ScalarValue};

/// Read-only view of a backend's parsed tree.
///
/// Handles are cheap copies borrowed from a tree that outlives the read call.
/// The engine never holds a handle past the call that produced the value.
pub trait FormatReader<'de> {
    /// Handle to an array node.
    type Array: Copy;
    /// Handle to an object node.
    type Object: Copy;
    /// Handle to any node.
    type Var: Copy;

    /// Look up a named child; `FieldNotFound` when absent, `KeyTypeError` when
    /// the object holds a key that is not a string.
    fn get_field(&self, name: &str, object: Self::Object) -> Result<Self::Var>;

    /// Positional child; `IndexOutOfBounds` when `index >= len`.
    fn get_field_by_index(&self, index: usize, array: Self::Array) -> Result<Self::Var>;

    /// True iff the node is the format's null marker.
    fn is_empty(&self, var: Self::Var) -> bool;

    /// Convert a scalar node.
    ///
    /// `kind` is the kind the engine is about to coerce to. Backends with
    /// typed scalars may ignore it and report the stored kind; backends with
    /// untyped text resolve the text as `kind`, failing with `TypeMismatch`.
    fn to_scalar(&self, var: Self::Var, kind: ScalarKind) -> Result<Scalar<'de>>;

    /// View the node as an array, or `TypeMismatch`.
    fn to_array(&self, var: Self::Var) -> Result<Self::Array>;

    /// View the node as an object, or `TypeMismatch`.
    fn to_object(&self, var: Self::Var) -> Result<Self::Object>;

    /// Visit array items in order, stopping at the first error.
    fn read_array<F>(&self, array: Self::Array, visit: F) -> Result<()>
    where
        F: FnMut(Self::Var) -> Result<()>;

    /// Visit object entries, stopping at the first error. Non-string keys are
    /// rejected with `KeyTypeError`.
    fn read_object<F>(&self, object: Self::Object, visit: F) -> Result<()>
    where
        F: FnMut(&str, Self::Var) -> Result<()>;

    /// Short name of the node's kind ("null", "array", ...) for diagnostics.
    fn kind_name(&self, var: Self::Var) -> &'static str;

    /// Convert a scalar node to one of the basic types.
    fn to_basic_type<T: BasicType>(&self, var: Self::Var) -> Result<T> {
        T::from_scalar(self.to_scalar(var, T::KIND)?)
    }

    /// Hand the node to `T`'s custom constructor.
    ///
    /// Errors returned by the hook, and panics raised inside it, come back as
    /// `CustomConstructorFailed`.
    fn use_custom_constructor<T: CustomConstructor>(&self, var: Self::Var) -> Result<T>
    where
        Self: Sized,
    {
        crate::custom::construct(self, var)
    }
}

/// A type a scalar node converts to directly.
pub trait BasicType: Sized {
    /// The kind requested from the reader.
    const KIND: ScalarKind;

    /// Coerce a scalar, failing with `TypeMismatch`.
    fn from_scalar(scalar: Scalar<'_>) -> Result<Self>;

    /// The scalar handed to a writer.
    fn to_scalar_value(&self) -> ScalarValue<'_>;
}

impl BasicType for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn from_scalar(scalar: Scalar<'_>) -> Result<Self> {
        match scalar {
            Scalar::String(s) => Ok(s.into_owned()),
            other => Err(other.mismatch(ScalarKind::String.name())),
        }
    }

    fn to_scalar_value(&self) -> ScalarValue<'_> {
        ScalarValue::Str(self)
    }
}

impl BasicType for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn from_scalar(scalar: Scalar<'_>) -> Result<Self> {
        match scalar {
            Scalar::Bool(b) => Ok(b),
            other => Err(other.mismatch(ScalarKind::Bool.name())),
        }
    }

    fn to_scalar_value(&self) -> ScalarValue<'_> {
        ScalarValue::Bool(*self)
    }
}

impl BasicType for f64 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn from_scalar(scalar: Scalar<'_>) -> Result<Self> {
        scalar.into_float("f64")
    }

    fn to_scalar_value(&self) -> ScalarValue<'_> {
        ScalarValue::F64(*self)
    }
}

impl BasicType for f32 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn from_scalar(scalar: Scalar<'_>) -> Result<Self> {
        let v = scalar.into_float("f32")?;
        let narrowed = v as f32;
        // a finite value past f32::MAX would otherwise become an infinity
        if v.is_finite() && !narrowed.is_finite() {
            return Err(Scalar::Float(v).mismatch("f32"));
        }
        Ok(narrowed)
    }

    fn to_scalar_value(&self) -> ScalarValue<'_> {
        ScalarValue::F64(f64::from(*self))
    }
}

macro_rules! impl_basic_signed {
    ($($ty:ty),*) => {$(
        impl BasicType for $ty {
            const KIND: ScalarKind = ScalarKind::Signed;

            fn from_scalar(scalar: Scalar<'_>) -> Result<Self> {
                scalar.into_integer(stringify!($ty))
            }

            fn to_scalar_value(&self) -> ScalarValue<'_> {
                ScalarValue::I64(*self as i64)
            }
        }
    )*};
}

macro_rules! impl_basic_unsigned {
    ($($ty:ty),*) => {$(
        impl BasicType for $ty {
            const KIND: ScalarKind = ScalarKind::Unsigned;

            fn from_scalar(scalar: Scalar<'_>) -> Result<Self> {
                scalar.into_integer(stringify!($ty))
            }

            fn to_scalar_value(&self) -> ScalarValue<'_> {
                ScalarValue::U64(*self as u64)
            }
        }
    )*};
}

impl_basic_signed!(i8, i16, i32, i64, isize);
impl_basic_unsigned!(u8, u16, u32, u64, usize);
