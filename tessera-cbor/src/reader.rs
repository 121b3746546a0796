use std::borrow::Cow;

use tessera_format::{FormatReader, ReadError, Result, Scalar, ScalarKind, SignedMagnitude};

use crate::Item;

/// Reads a decoded [`Item`] tree.
///
/// Maps must have text keys to be read as objects; any other key is a
/// `KeyTypeError` as soon as the map is looked into.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborReader;

impl CborReader {
    /// Create a reader.
    pub const fn new() -> Self {
        CborReader
    }
}

fn key_text(key: &Item) -> Result<&str> {
    match key {
        Item::Text(text) => Ok(text),
        other => Err(ReadError::key_type(other.kind_name())),
    }
}

impl<'de> FormatReader<'de> for CborReader {
    type Array = &'de [Item];
    type Object = &'de [(Item, Item)];
    type Var = &'de Item;

    fn get_field(&self, name: &str, object: Self::Object) -> Result<Self::Var> {
        let mut found = None;
        for (key, value) in object {
            if key_text(key)? == name && found.is_none() {
                found = Some(value);
            }
        }
        found.ok_or_else(|| ReadError::field_not_found(name))
    }

    fn get_field_by_index(&self, index: usize, array: Self::Array) -> Result<Self::Var> {
        array
            .get(index)
            .ok_or_else(|| ReadError::index_out_of_bounds(index, array.len()))
    }

    fn is_empty(&self, var: Self::Var) -> bool {
        matches!(var, Item::Null)
    }

    fn to_scalar(&self, var: Self::Var, kind: ScalarKind) -> Result<Scalar<'de>> {
        match var {
            Item::Unsigned(v) => Ok(SignedMagnitude {
                negative: false,
                magnitude: *v,
            }
            .into_scalar()),
            Item::Negative(m) => Ok(SignedMagnitude {
                negative: true,
                magnitude: *m,
            }
            .into_scalar()),
            Item::Text(text) => Ok(Scalar::String(Cow::Borrowed(text))),
            Item::Bool(b) => Ok(Scalar::Bool(*b)),
            Item::Float(v) => Ok(Scalar::Float(*v)),
            other => Err(ReadError::type_mismatch(kind.name(), other.kind_name())),
        }
    }

    fn to_array(&self, var: Self::Var) -> Result<Self::Array> {
        match var {
            Item::Array(items) => Ok(items),
            other => Err(ReadError::type_mismatch("array", other.kind_name())),
        }
    }

    fn to_object(&self, var: Self::Var) -> Result<Self::Object> {
        match var {
            Item::Map(entries) => Ok(entries),
            other => Err(ReadError::type_mismatch("map", other.kind_name())),
        }
    }

    fn read_array<F>(&self, array: Self::Array, mut visit: F) -> Result<()>
    where
        F: FnMut(Self::Var) -> Result<()>,
    {
        array.iter().try_for_each(|item| visit(item))
    }

    fn read_object<F>(&self, object: Self::Object, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, Self::Var) -> Result<()>,
    {
        object
            .iter()
            .try_for_each(|(key, value)| visit(key_text(key)?, value))
    }

    fn kind_name(&self, var: Self::Var) -> &'static str {
        var.kind_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_format::ErrorKind;

    #[tessera_testhelpers::test]
    fn negative_items_decode_through_the_magnitude() {
        let reader = CborReader;
        let item = Item::Negative(0);
        assert!(matches!(
            reader.to_scalar(&item, ScalarKind::Signed).unwrap(),
            Scalar::Signed(-1)
        ));
        let item = Item::Negative(u64::MAX);
        assert!(matches!(
            reader.to_scalar(&item, ScalarKind::Signed).unwrap(),
            Scalar::Signed(v) if v == -(u64::MAX as i128) - 1
        ));
    }

    #[tessera_testhelpers::test]
    fn non_text_keys_are_rejected() {
        let reader = CborReader;
        let map = Item::Map(vec![(Item::Unsigned(1), Item::Null)]);
        let object = reader.to_object(&map).unwrap();
        let err = reader.get_field("a", object).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::KeyTypeError {
                got: "unsigned integer".into()
            }
        );
        assert!(reader.read_object(object, |_, _| Ok(())).is_err());
    }

    #[tessera_testhelpers::test]
    fn byte_strings_are_not_scalars() {
        let reader = CborReader;
        let err = reader
            .to_scalar(&Item::Bytes(vec![1]), ScalarKind::String)
            .unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected string, got byte string");
    }
}
