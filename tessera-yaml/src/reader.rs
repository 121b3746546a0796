use std::borrow::Cow;

use tessera_format::{FormatReader, ReadError, Result, Scalar, ScalarKind};

use crate::Node;
use crate::node::is_null_text;

/// Reads a composed [`Node`] tree.
///
/// Plain scalars are resolved against the kind being read, following the YAML
/// 1.2 core schema. Text that does not resolve is handed over as a string so
/// the mismatch names the target type.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlReader;

impl YamlReader {
    /// Create a reader.
    pub const fn new() -> Self {
        YamlReader
    }
}

fn key_text(key: &Node) -> Result<&str> {
    match key {
        Node::Scalar { text, .. } => Ok(text),
        other => Err(ReadError::key_type(other.kind_name())),
    }
}

fn resolve<'de>(text: &str, kind: ScalarKind) -> Option<Scalar<'de>> {
    match kind {
        ScalarKind::String => None,
        ScalarKind::Bool => resolve_bool(text).map(Scalar::Bool),
        ScalarKind::Signed | ScalarKind::Unsigned => resolve_int(text),
        // core schema: integer text is an integer even when a float is wanted
        ScalarKind::Float => resolve_int(text).or_else(|| resolve_float(text).map(Scalar::Float)),
    }
}

fn resolve_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Decimal with optional sign, or unsigned `0x` hex and `0o` octal.
pub(crate) fn resolve_int<'de>(text: &str) -> Option<Scalar<'de>> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let signed = digits.len() != text.len();
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").filter(|_| !signed) {
        digits_in_radix(hex, 16)?
    } else if let Some(octal) = digits.strip_prefix("0o").filter(|_| !signed) {
        digits_in_radix(octal, 8)?
    } else {
        digits_in_radix(digits, 10)?
    };
    if negative {
        i128::try_from(magnitude).ok().map(|m| Scalar::Signed(-m))
    } else {
        u64::try_from(magnitude)
            .map(Scalar::Unsigned)
            .ok()
            .or_else(|| i128::try_from(magnitude).ok().map(Scalar::Signed))
    }
}

fn digits_in_radix(digits: &str, radix: u32) -> Option<u128> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok()
}

/// Core schema floats, including `.inf` and `.nan`.
pub(crate) fn resolve_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    let well_formed = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return None;
    }
    text.parse().ok()
}

impl<'de> FormatReader<'de> for YamlReader {
    type Array = &'de [Node];
    type Object = &'de [(Node, Node)];
    type Var = &'de Node;

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
        var.is_null()
    }

    fn to_scalar(&self, var: Self::Var, kind: ScalarKind) -> Result<Scalar<'de>> {
        match var {
            Node::Scalar { text, quoted: true } => Ok(Scalar::String(Cow::Borrowed(text))),
            Node::Scalar { text, .. } if is_null_text(text) => {
                Err(ReadError::type_mismatch(kind.name(), "null"))
            }
            Node::Scalar { text, .. } => {
                Ok(resolve(text, kind).unwrap_or(Scalar::String(Cow::Borrowed(text))))
            }
            other => Err(ReadError::type_mismatch(kind.name(), other.kind_name())),
        }
    }

    fn to_array(&self, var: Self::Var) -> Result<Self::Array> {
        match var {
            Node::Sequence(items) => Ok(items),
            other => Err(ReadError::type_mismatch("sequence", other.kind_name())),
        }
    }

    fn to_object(&self, var: Self::Var) -> Result<Self::Object> {
        match var {
            Node::Mapping(entries) => Ok(entries),
            other => Err(ReadError::type_mismatch("mapping", other.kind_name())),
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

    fn read(text: &str, kind: ScalarKind) -> Result<Scalar<'static>> {
        let node = Node::plain(text);
        YamlReader.to_scalar(&node, kind).map(|scalar| match scalar {
            Scalar::String(s) => Scalar::String(Cow::Owned(s.into_owned())),
            Scalar::Bool(b) => Scalar::Bool(b),
            Scalar::Float(v) => Scalar::Float(v),
            Scalar::Signed(v) => Scalar::Signed(v),
            Scalar::Unsigned(v) => Scalar::Unsigned(v),
        })
    }

    #[tessera_testhelpers::test]
    fn plain_scalars_resolve_by_requested_kind() {
        assert_eq!(read("42", ScalarKind::Unsigned).unwrap(), Scalar::Unsigned(42));
        assert_eq!(
            read("42", ScalarKind::String).unwrap(),
            Scalar::String("42".into())
        );
        assert_eq!(read("-7", ScalarKind::Signed).unwrap(), Scalar::Signed(-7));
        assert_eq!(read("0x1F", ScalarKind::Unsigned).unwrap(), Scalar::Unsigned(31));
        assert_eq!(read("0o17", ScalarKind::Unsigned).unwrap(), Scalar::Unsigned(15));
        assert_eq!(read("True", ScalarKind::Bool).unwrap(), Scalar::Bool(true));
        assert_eq!(read("2.5e1", ScalarKind::Float).unwrap(), Scalar::Float(25.0));
        assert_eq!(read("5.0", ScalarKind::Float).unwrap(), Scalar::Float(5.0));
        assert_eq!(
            read("-.inf", ScalarKind::Float).unwrap(),
            Scalar::Float(f64::NEG_INFINITY)
        );
    }

    #[tessera_testhelpers::test]
    fn unresolved_text_stays_a_string() {
        assert_eq!(
            read("yes", ScalarKind::Bool).unwrap(),
            Scalar::String("yes".into())
        );
        assert_eq!(
            read("-0x10", ScalarKind::Signed).unwrap(),
            Scalar::String("-0x10".into())
        );
        assert_eq!(
            read("inf", ScalarKind::Float).unwrap(),
            Scalar::String("inf".into())
        );
    }

    #[tessera_testhelpers::test]
    fn integer_text_is_not_a_float() {
        assert_eq!(read("5", ScalarKind::Float).unwrap(), Scalar::Unsigned(5));
        assert_eq!(read("-12", ScalarKind::Float).unwrap(), Scalar::Signed(-12));
    }

    #[tessera_testhelpers::test]
    fn large_magnitudes() {
        assert_eq!(
            read("18446744073709551616", ScalarKind::Unsigned).unwrap(),
            Scalar::Signed(18446744073709551616)
        );
        assert_eq!(
            read("-9223372036854775808", ScalarKind::Signed).unwrap(),
            Scalar::Signed(i64::MIN as i128)
        );
    }

    #[tessera_testhelpers::test]
    fn nulls_are_not_scalars() {
        let err = read("~", ScalarKind::String).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected string, got null");
        assert!(YamlReader.is_empty(&Node::plain("")));
        assert!(!YamlReader.is_empty(&Node::quoted("")));
    }

    #[tessera_testhelpers::test]
    fn collection_keys_are_rejected() {
        let node = Node::Mapping(vec![(Node::Sequence(vec![]), Node::null())]);
        let object = YamlReader.to_object(&node).unwrap();
        let err = YamlReader.get_field("a", object).unwrap_err();
        assert_eq!(err.to_string(), "object keys must be strings, got sequence");
    }
}
