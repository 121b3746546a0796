use std::io;

use tessera_format::{Built, Model, ScalarValue, TreeWriter, serialize_root};

use crate::emit::{emit, needs_quotes};
use crate::{Node, trace};

/// Writer building a [`Node`] tree.
pub type YamlWriter = TreeWriter<Node>;

fn text(s: &str) -> Node {
    Node::Scalar {
        text: s.to_owned(),
        quoted: needs_quotes(s),
    }
}

fn leaf(value: ScalarValue<'_>) -> Node {
    match value {
        ScalarValue::Str(s) => text(s),
        ScalarValue::Bool(b) => Node::plain(if b { "true" } else { "false" }),
        ScalarValue::F64(v) if v.is_nan() => Node::plain(".nan"),
        ScalarValue::F64(v) if v.is_infinite() => {
            Node::plain(if v > 0.0 { ".inf" } else { "-.inf" })
        }
        // Debug keeps a fractional part on whole numbers
        ScalarValue::F64(v) => Node::plain(format!("{v:?}")),
        ScalarValue::I64(v) => Node::plain(v.to_string()),
        ScalarValue::U64(v) => Node::plain(v.to_string()),
    }
}

/// Create a writer whose tree is assembled into a [`Node`].
pub fn yaml_writer() -> YamlWriter {
    TreeWriter::new(leaf)
}

/// Assemble a finished writer into its [`Node`].
pub fn finish(writer: YamlWriter) -> Node {
    writer.finish(|built| match built {
        Built::Null => Node::null(),
        Built::Leaf(node) => node,
        Built::Array(items) => Node::Sequence(items),
        Built::Object(entries) => Node::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (text(&key), value))
                .collect(),
        ),
    })
}

/// Convert a value to a [`Node`] tree.
pub fn to_node<T: Model>(value: &T) -> Node {
    trace!(type_name = T::SHAPE.type_identifier, "to_node");
    let mut writer = yaml_writer();
    serialize_root(value, &mut writer);
    finish(writer)
}

/// Serialize a value to a block-style YAML document.
pub fn to_string<T: Model>(value: &T) -> String {
    emit(&to_node(value))
}

/// Serialize a value as YAML into an `io::Write`.
pub fn to_writer<W: io::Write, T: Model>(mut writer: W, value: &T) -> io::Result<()> {
    writer.write_all(to_string(value).as_bytes())
}
