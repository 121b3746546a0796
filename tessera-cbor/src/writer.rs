use tessera_format::{Built, Model, ScalarValue, TreeWriter, serialize_root};

use crate::{Item, encode, trace};

/// Writer building an [`Item`] tree.
pub type CborWriter = TreeWriter<Item>;

fn leaf(value: ScalarValue<'_>) -> Item {
    match value {
        ScalarValue::Str(s) => Item::Text(s.to_owned()),
        ScalarValue::Bool(b) => Item::Bool(b),
        ScalarValue::F64(v) => Item::Float(v),
        ScalarValue::I64(v) => Item::from_i64(v),
        ScalarValue::U64(v) => Item::Unsigned(v),
    }
}

/// Create a writer whose tree is assembled into an [`Item`].
pub fn cbor_writer() -> CborWriter {
    TreeWriter::new(leaf)
}

/// Assemble a finished writer into its [`Item`]. Object keys become text
/// strings.
pub fn finish(writer: CborWriter) -> Item {
    writer.finish(|built| match built {
        Built::Null => Item::Null,
        Built::Leaf(item) => item,
        Built::Array(items) => Item::Array(items),
        Built::Object(entries) => Item::Map(
            entries
                .into_iter()
                .map(|(key, value)| (Item::Text(key), value))
                .collect(),
        ),
    })
}

/// Convert a value to an [`Item`] tree.
pub fn to_item<T: Model>(value: &T) -> Item {
    trace!(type_name = T::SHAPE.type_identifier, "to_item");
    let mut writer = cbor_writer();
    serialize_root(value, &mut writer);
    finish(writer)
}

/// Serialize a value to CBOR bytes.
pub fn to_vec<T: Model>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    encode::encode(&to_item(value), &mut out);
    out
}

/// Serialize a value as CBOR into an `io::Write`.
pub fn to_writer<W: std::io::Write, T: Model>(mut writer: W, value: &T) -> std::io::Result<()> {
    writer.write_all(&to_vec(value))
}
