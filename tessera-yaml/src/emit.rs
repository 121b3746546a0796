//! [`Node`] tree to block-style YAML text.

use core::fmt::Write as _;

use crate::Node;

const INDENT: usize = 2;

/// Render `node` as one document, ending in a newline.
pub fn emit(node: &Node) -> String {
    let mut out = String::new();
    match node {
        Node::Sequence(items) if !items.is_empty() => sequence(items, 0, false, &mut out),
        Node::Mapping(entries) if !entries.is_empty() => mapping(entries, 0, false, &mut out),
        other => {
            inline(other, &mut out);
            out.push('\n');
        }
    }
    out
}

/// Entries at `indent`. With `continued`, the first entry goes on the current
/// line, right after a sequence dash.
fn mapping(entries: &[(Node, Node)], indent: usize, continued: bool, out: &mut String) {
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 || !continued {
            pad(indent, out);
        }
        inline(key, out);
        out.push(':');
        match value {
            Node::Mapping(inner) if !inner.is_empty() => {
                out.push('\n');
                mapping(inner, indent + INDENT, false, out);
            }
            Node::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                sequence(items, indent + INDENT, false, out);
            }
            other => {
                out.push(' ');
                inline(other, out);
                out.push('\n');
            }
        }
    }
}

fn sequence(items: &[Node], indent: usize, continued: bool, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !continued {
            pad(indent, out);
        }
        out.push_str("- ");
        match item {
            Node::Mapping(inner) if !inner.is_empty() => {
                mapping(inner, indent + INDENT, true, out);
            }
            Node::Sequence(inner) if !inner.is_empty() => {
                sequence(inner, indent + INDENT, true, out);
            }
            other => {
                inline(other, out);
                out.push('\n');
            }
        }
    }
}

/// Flow rendering, used for scalars, empty collections and complex keys.
fn inline(node: &Node, out: &mut String) {
    match node {
        Node::Scalar { text, quoted } => scalar(text, *quoted, out),
        Node::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                inline(item, out);
            }
            out.push(']');
        }
        Node::Mapping(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                inline(key, out);
                out.push_str(": ");
                inline(value, out);
            }
            out.push('}');
        }
    }
}

fn scalar(text: &str, quoted: bool, out: &mut String) {
    if !quoted {
        out.push_str(if text.is_empty() { "null" } else { text });
        return;
    }
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn pad(indent: usize, out: &mut String) {
    out.extend(core::iter::repeat_n(' ', indent));
}

/// Whether `s` must be quoted to read back as the same string.
pub(crate) fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.contains(": ")
        || s.contains(" #")
        || s.ends_with(':')
        || s.contains(['\n', '\r', '\t', '"', '\'', '\\'])
        || s.chars().any(char::is_control)
        || s.starts_with(' ')
        || s.ends_with(' ')
        || s.starts_with([
            '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '%', '@', '`',
        ])
        || looks_like_bool(s)
        || crate::node::is_null_text(s)
        || looks_like_number(s)
}

fn looks_like_bool(s: &str) -> bool {
    matches!(
        s,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" | "yes" | "Yes" | "YES" | "no"
            | "No" | "NO" | "on" | "On" | "ON" | "off" | "Off" | "OFF" | "y" | "Y" | "n" | "N"
    )
}

fn looks_like_number(s: &str) -> bool {
    s.parse::<f64>().is_ok()
        || crate::reader::resolve_int(s).is_some()
        || crate::reader::resolve_float(s).is_some()
}
