/// A composed YAML node with aliases already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A scalar and whether it was written in a quoted or block style.
    ///
    /// Plain scalars are resolved when read; all others are strings.
    Scalar {
        /// The scalar's text after unescaping and folding.
        text: String,
        /// False only for plain scalars.
        quoted: bool,
    },
    /// A sequence.
    Sequence(Vec<Node>),
    /// A mapping, entries in document order.
    Mapping(Vec<(Node, Node)>),
}

impl Node {
    /// A plain scalar.
    pub fn plain(text: impl Into<String>) -> Self {
        Node::Scalar {
            text: text.into(),
            quoted: false,
        }
    }

    /// A scalar that is always a string.
    pub fn quoted(text: impl Into<String>) -> Self {
        Node::Scalar {
            text: text.into(),
            quoted: true,
        }
    }

    /// The plain `null` scalar.
    pub fn null() -> Self {
        Node::plain("null")
    }

    /// True for plain scalars spelling null in the core schema, including the
    /// empty scalar of a key with no value.
    pub fn is_null(&self) -> bool {
        match self {
            Node::Scalar {
                text,
                quoted: false,
            } => is_null_text(text),
            _ => false,
        }
    }

    /// Number of nodes in the tree, this one included.
    pub(crate) fn size(&self) -> usize {
        match self {
            Node::Scalar { .. } => 1,
            Node::Sequence(items) => 1 + items.iter().map(Node::size).sum::<usize>(),
            Node::Mapping(entries) => {
                1 + entries
                    .iter()
                    .map(|(key, value)| key.size() + value.size())
                    .sum::<usize>()
            }
        }
    }

    /// Short name of the node's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar { .. } if self.is_null() => "null",
            Node::Scalar { quoted: true, .. } => "string",
            Node::Scalar { .. } => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }
}

pub(crate) fn is_null_text(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}
