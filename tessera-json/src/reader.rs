use std::borrow::Cow;

use serde_json::{Map, Number, Value};
use tessera_format::{FormatReader, ReadError, Result, Scalar, ScalarKind};

/// Reads a `serde_json::Value` tree.
///
/// JSON is self-describing, so scalars are reported as stored and the
/// engine's coercion rules decide whether they fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    /// Create a reader.
    pub const fn new() -> Self {
        JsonReader
    }
}

fn number_scalar<'de>(number: &Number) -> Scalar<'de> {
    if let Some(v) = number.as_u64() {
        Scalar::Unsigned(v)
    } else if let Some(v) = number.as_i64() {
        Scalar::Signed(i128::from(v))
    } else {
        // finite by construction: serde_json rejects NaN and infinities
        Scalar::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

impl<'de> FormatReader<'de> for JsonReader {
    type Array = &'de [Value];
    type Object = &'de Map<String, Value>;
    type Var = &'de Value;

    fn get_field(&self, name: &str, object: Self::Object) -> Result<Self::Var> {
        object
            .get(name)
            .ok_or_else(|| ReadError::field_not_found(name))
    }

    fn get_field_by_index(&self, index: usize, array: Self::Array) -> Result<Self::Var> {
        array
            .get(index)
            .ok_or_else(|| ReadError::index_out_of_bounds(index, array.len()))
    }

    fn is_empty(&self, var: Self::Var) -> bool {
        var.is_null()
    }

    fn to_scalar(&self, var: Self::Var, kind: ScalarKind) -> Result<Scalar<'de>> {
        match var {
            Value::String(s) => Ok(Scalar::String(Cow::Borrowed(s))),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => Ok(number_scalar(n)),
            other => Err(ReadError::type_mismatch(kind.name(), self.kind_name(other))),
        }
    }

    fn to_array(&self, var: Self::Var) -> Result<Self::Array> {
        match var {
            Value::Array(items) => Ok(items),
            other => Err(ReadError::type_mismatch("array", self.kind_name(other))),
        }
    }

    fn to_object(&self, var: Self::Var) -> Result<Self::Object> {
        match var {
            Value::Object(map) => Ok(map),
            other => Err(ReadError::type_mismatch("object", self.kind_name(other))),
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
        object.iter().try_for_each(|(key, value)| visit(key, value))
    }

    fn kind_name(&self, var: Self::Var) -> &'static str {
        match var {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tessera_testhelpers::test]
    fn numbers_keep_their_sign() {
        let value = json!([1, -1, 1.5, 18446744073709551615u64]);
        let reader = JsonReader;
        let items = reader.to_array(&value).unwrap();
        let scalars: Vec<_> = items
            .iter()
            .map(|v| reader.to_scalar(v, ScalarKind::Signed).unwrap())
            .collect();
        assert!(matches!(scalars[0], Scalar::Unsigned(1)));
        assert!(matches!(scalars[1], Scalar::Signed(-1)));
        assert!(matches!(scalars[2], Scalar::Float(v) if v == 1.5));
        assert!(matches!(scalars[3], Scalar::Unsigned(u64::MAX)));
    }

    #[tessera_testhelpers::test]
    fn missing_keys_are_field_not_found() {
        let value = json!({"a": 1});
        let reader = JsonReader;
        let object = reader.to_object(&value).unwrap();
        let err = reader.get_field("b", object).unwrap_err();
        assert!(err.is_field_not_found());
        assert_eq!(err.to_string(), "Field named 'b' not found.");
    }

    #[tessera_testhelpers::test]
    fn null_is_empty_and_not_a_scalar() {
        let reader = JsonReader;
        assert!(reader.is_empty(&Value::Null));
        let err = reader.to_scalar(&Value::Null, ScalarKind::String).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected string, got null");
    }
}
