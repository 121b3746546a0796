//! Event stream to [`Node`] tree.

use std::collections::HashMap;

use saphyr_parser::{Event, Parser, ScalarStyle, Span};

use crate::{Node, YamlError, trace};

/// Most nodes that aliases may copy into one document.
pub const MAX_ALIAS_NODES: usize = 100_000;

/// Parse a YAML stream holding at most one document.
///
/// An empty stream composes to a null scalar. Aliases expand to copies of
/// their anchored node; a document whose aliases copy more than
/// [`MAX_ALIAS_NODES`] nodes is rejected.
pub fn parse(input: &str) -> Result<Node, YamlError> {
    let mut parser = Parser::new_from_str(input);
    let mut composer = Composer::default();
    while let Some(next) = parser.next_event() {
        let (event, span) = next.map_err(|err| YamlError::Syntax(format!("{err}")))?;
        composer.on_event(event, span)?;
    }
    Ok(composer.root.unwrap_or_else(Node::null))
}

#[derive(Default)]
struct Composer {
    stack: Vec<Frame>,
    // anchored node and its size
    anchors: HashMap<usize, (Node, usize)>,
    copied: usize,
    root: Option<Node>,
}

enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Node>,
    },
    Mapping {
        anchor: usize,
        entries: Vec<(Node, Node)>,
        key: Option<Node>,
    },
}

impl Composer {
    fn on_event(&mut self, event: Event<'_>, span: Span) -> Result<(), YamlError> {
        let offset = span.start.index();
        match event {
            Event::Scalar(text, style, anchor, _tag) => {
                let node = Node::Scalar {
                    text: text.into_owned(),
                    quoted: !matches!(style, ScalarStyle::Plain),
                };
                self.complete(node, anchor, offset)
            }
            Event::SequenceStart(anchor, _tag) => {
                self.stack.push(Frame::Sequence {
                    anchor,
                    items: Vec::new(),
                });
                Ok(())
            }
            Event::MappingStart(anchor, _tag) => {
                self.stack.push(Frame::Mapping {
                    anchor,
                    entries: Vec::new(),
                    key: None,
                });
                Ok(())
            }
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence { anchor, items }) => {
                    self.complete(Node::Sequence(items), anchor, offset)
                }
                Some(Frame::Mapping {
                    anchor, entries, ..
                }) => self.complete(Node::Mapping(entries), anchor, offset),
                None => Err(YamlError::Syntax(format!(
                    "unbalanced collection end at offset {offset}"
                ))),
            },
            Event::Alias(id) => {
                // anchors register when their node completes
                let (node, size) = self
                    .anchors
                    .get(&id)
                    .ok_or(YamlError::RecursiveAlias { offset })?;
                self.copied = self.copied.saturating_add(*size);
                if self.copied > MAX_ALIAS_NODES {
                    return Err(YamlError::AliasLimit { offset });
                }
                let node = node.clone();
                self.complete(node, 0, offset)
            }
            Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart(_)
            | Event::DocumentEnd
            | Event::Nothing => Ok(()),
        }
    }

    fn complete(&mut self, node: Node, anchor: usize, offset: usize) -> Result<(), YamlError> {
        if anchor != 0 {
            trace!(anchor, offset, "anchored node");
            self.anchors.insert(anchor, (node.clone(), node.size()));
        }
        match self.stack.last_mut() {
            None if self.root.is_some() => Err(YamlError::MultipleDocuments { offset }),
            None => {
                self.root = Some(node);
                Ok(())
            }
            Some(Frame::Sequence { items, .. }) => {
                items.push(node);
                Ok(())
            }
            Some(Frame::Mapping { entries, key, .. }) => {
                match key.take() {
                    Some(key) => entries.push((key, node)),
                    None => *key = Some(node),
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[tessera_testhelpers::test]
    fn block_and_flow_collections() {
        let node = parse(indoc! {"
            name: tessera
            tags: [core, 'wire']
            nested:
              - a: 1
              - ~
        "})
        .unwrap();
        assert_eq!(
            node,
            Node::Mapping(vec![
                (Node::plain("name"), Node::plain("tessera")),
                (
                    Node::plain("tags"),
                    Node::Sequence(vec![Node::plain("core"), Node::quoted("wire")])
                ),
                (
                    Node::plain("nested"),
                    Node::Sequence(vec![
                        Node::Mapping(vec![(Node::plain("a"), Node::plain("1"))]),
                        Node::plain("~"),
                    ])
                ),
            ])
        );
    }

    #[tessera_testhelpers::test]
    fn aliases_expand_to_copies() {
        let node = parse(indoc! {"
            base: &b
              x: 1
            copy: *b
        "})
        .unwrap();
        let Node::Mapping(entries) = node else {
            panic!("expected a mapping");
        };
        assert_eq!(entries[0].1, entries[1].1);
    }

    #[tessera_testhelpers::test]
    fn nested_alias_fan_out_is_bounded() {
        // each level holds ten copies of the one below
        let mut doc = String::from("l0: &l0 [x, x, x, x, x, x, x, x, x, x]\n");
        for level in 1..9 {
            let prev = level - 1;
            let refs = vec![format!("*l{prev}"); 10].join(", ");
            doc.push_str(&format!("l{level}: &l{level} [{refs}]\n"));
        }
        let err = parse(&doc).unwrap_err();
        assert!(matches!(err, YamlError::AliasLimit { .. }), "{err}");
    }

    #[tessera_testhelpers::test]
    fn modest_alias_use_is_fine() {
        let mut doc = String::from("l0: &l0 [x, x, x, x, x, x, x, x, x, x]\n");
        for level in 1..3 {
            let prev = level - 1;
            let refs = vec![format!("*l{prev}"); 10].join(", ");
            doc.push_str(&format!("l{level}: &l{level} [{refs}]\n"));
        }
        let Node::Mapping(entries) = parse(&doc).unwrap() else {
            panic!("expected a mapping");
        };
        // [10 x [10 x [10 scalars]]]
        assert_eq!(entries[2].1.size(), 1111);
    }

    #[tessera_testhelpers::test]
    fn block_scalars_are_quoted() {
        let node = parse("text: |\n  line one\n  line two\n").unwrap();
        let Node::Mapping(entries) = node else {
            panic!("expected a mapping");
        };
        assert_eq!(entries[0].1, Node::quoted("line one\nline two\n"));
    }

    #[tessera_testhelpers::test]
    fn empty_stream_is_null() {
        assert!(parse("").unwrap().is_null());
        assert!(parse("# only a comment\n").unwrap().is_null());
    }

    #[tessera_testhelpers::test]
    fn one_document_only() {
        let err = parse("a: 1\n---\nb: 2\n").unwrap_err();
        assert!(matches!(err, YamlError::MultipleDocuments { .. }), "{err}");
    }

    #[tessera_testhelpers::test]
    fn syntax_errors() {
        let err = parse("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, YamlError::Syntax(_)), "{err}");
    }
}
