use std::borrow::Cow;

use crate::{ErrorKind, ReadError, Result};

/// The closed set of scalar kinds every backend must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// UTF-8 text.
    String,
    /// `true` / `false`.
    Bool,
    /// IEEE 754 floating point.
    Float,
    /// Signed integer.
    Signed,
    /// Unsigned integer.
    Unsigned,
}

impl ScalarKind {
    /// Human-readable name, used in mismatch messages.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Float => "floating-point number",
            ScalarKind::Signed => "signed integer",
            ScalarKind::Unsigned => "unsigned integer",
        }
    }
}

/// A scalar handed to a writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue<'a> {
    /// Text.
    Str(&'a str),
    /// Boolean.
    Bool(bool),
    /// Floating point, already widened.
    F64(f64),
    /// Signed integer, already widened.
    I64(i64),
    /// Unsigned integer, already widened.
    U64(u64),
}

/// A scalar produced by a reader.
///
/// Signed values are carried as `i128` so that a sign-magnitude backend can
/// report every value its widest width can hold, including `-(u64::MAX) - 1`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'de> {
    /// Text, borrowed from the tree when possible.
    String(Cow<'de, str>),
    /// Boolean.
    Bool(bool),
    /// Floating point.
    Float(f64),
    /// Signed integer.
    Signed(i128),
    /// Unsigned integer.
    Unsigned(u64),
}

impl Scalar<'_> {
    /// The kind this scalar was stored as.
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::String(_) => ScalarKind::String,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Signed(_) => ScalarKind::Signed,
            Scalar::Unsigned(_) => ScalarKind::Unsigned,
        }
    }

    /// Short description used as the `got` half of a mismatch.
    pub fn describe(&self) -> String {
        match self {
            Scalar::String(s) => format!("string {s:?}"),
            Scalar::Bool(b) => format!("bool {b}"),
            Scalar::Float(v) => format!("float {v}"),
            Scalar::Signed(v) => format!("integer {v}"),
            Scalar::Unsigned(v) => format!("integer {v}"),
        }
    }

    /// Mismatch error for a request of `expected`.
    pub fn mismatch(&self, expected: &'static str) -> ReadError {
        ReadError::type_mismatch(expected, self.describe())
    }

    /// Apply the integer rules: any integer that fits is accepted.
    pub fn into_integer<T>(self, expected: &'static str) -> Result<T>
    where
        T: TryFrom<i128> + TryFrom<u64>,
    {
        let fitted = match &self {
            Scalar::Signed(v) => <T as TryFrom<i128>>::try_from(*v).ok(),
            Scalar::Unsigned(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
            _ => None,
        };
        fitted.ok_or_else(|| self.mismatch(expected))
    }

    /// Apply the float rules: only a float node is a float.
    pub fn into_float(self, expected: &'static str) -> Result<f64> {
        match self {
            Scalar::Float(v) => Ok(v),
            other => Err(other.mismatch(expected)),
        }
    }
}

/// Storage width of an integer in a width-tagged encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntWidth {
    /// One byte.
    W8,
    /// Two bytes.
    W16,
    /// Four bytes.
    W32,
    /// Eight bytes.
    W64,
}

impl IntWidth {
    /// Map a byte count to a width; anything else is `UnknownWidth`.
    pub fn from_bytes(bytes: u8) -> Result<Self> {
        match bytes {
            1 => Ok(IntWidth::W8),
            2 => Ok(IntWidth::W16),
            4 => Ok(IntWidth::W32),
            8 => Ok(IntWidth::W64),
            _ => Err(ErrorKind::UnknownWidth { bytes }.into()),
        }
    }

    /// Number of bytes used by this width.
    pub const fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
        }
    }

    /// Largest value storable in this width.
    pub const fn max(self) -> u64 {
        match self {
            IntWidth::W8 => u8::MAX as u64,
            IntWidth::W16 => u16::MAX as u64,
            IntWidth::W32 => u32::MAX as u64,
            IntWidth::W64 => u64::MAX,
        }
    }

    /// Smallest width able to hold `value`.
    pub const fn fitting(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            IntWidth::W8
        } else if value <= u16::MAX as u64 {
            IntWidth::W16
        } else if value <= u32::MAX as u64 {
            IntWidth::W32
        } else {
            IntWidth::W64
        }
    }

    /// Widen a big-endian integer of this width to `u64`.
    ///
    /// `bytes` must hold exactly [`IntWidth::bytes`] bytes.
    pub fn read_be(self, bytes: &[u8]) -> u64 {
        debug_assert_eq!(bytes.len(), self.bytes());
        bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    /// Append `value` as a big-endian integer of this width.
    pub fn write_be(self, value: u64, out: &mut Vec<u8>) {
        debug_assert!(value <= self.max());
        out.extend_from_slice(&value.to_be_bytes()[8 - self.bytes()..]);
    }
}

/// A signed integer stored as a non-negative magnitude plus a negative flag.
///
/// Negative values store `-1 - value`, so `-1` has magnitude `0` and each width
/// holds one more negative value than positive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedMagnitude {
    /// Whether the value is negative.
    pub negative: bool,
    /// The stored magnitude.
    pub magnitude: u64,
}

impl SignedMagnitude {
    /// Split a signed value into flag and magnitude.
    pub const fn encode(value: i64) -> Self {
        if value < 0 {
            SignedMagnitude {
                negative: true,
                magnitude: (-1 - value) as u64,
            }
        } else {
            SignedMagnitude {
                negative: false,
                magnitude: value as u64,
            }
        }
    }

    /// Recombine flag and magnitude: `-(magnitude) - 1` when negative.
    pub const fn decode(self) -> i128 {
        if self.negative {
            -(self.magnitude as i128) - 1
        } else {
            self.magnitude as i128
        }
    }

    /// Decode into the scalar a reader reports.
    pub fn into_scalar<'de>(self) -> Scalar<'de> {
        if self.negative {
            Scalar::Signed(self.decode())
        } else {
            Scalar::Unsigned(self.magnitude)
        }
    }
}
