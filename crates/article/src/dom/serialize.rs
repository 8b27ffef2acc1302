// ABOUTME: Serializes a Document back to HTML text.
// ABOUTME: Handles escaping, void and raw-text elements, prefixed attributes and leading newlines in pre.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use scraper::Node;
use std::collections::HashSet;

use super::{Document, NodeId};

static VOID_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
        "track", "wbr",
    ]
    .into_iter()
    .collect()
});

// Children of these are emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

// The parser drops one newline right after these start tags.
const NEWLINE_EATERS: &[&str] = &["pre", "textarea", "listing"];

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn starts_with_newline(node: NodeRef<'_, Node>) -> bool {
    node.first_child()
        .and_then(|child| child.value().as_text().map(|t| t.starts_with('\n')))
        .unwrap_or(false)
}

impl Document {
    /// Serializes the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    /// Serializes `id` including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            write_node(node, false, &mut out);
        }
        out
    }

    /// Serializes the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            write_children(node, &mut out);
        }
        out
    }
}

fn write_children(node: NodeRef<'_, Node>, out: &mut String) {
    let raw = node
        .value()
        .as_element()
        .is_some_and(|el| RAW_TEXT_ELEMENTS.contains(&el.name()));
    for child in node.children() {
        write_node(child, raw, out);
    }
}

fn write_node(node: NodeRef<'_, Node>, raw_parent: bool, out: &mut String) {
    match node.value() {
        Node::Document | Node::Fragment => write_children(node, out),
        Node::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype.name());
            out.push('>');
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Text(text) => {
            if raw_parent {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Node::Element(el) => {
            let name = el.name();
            out.push('<');
            out.push_str(name);
            for (qual, value) in el.attrs.iter() {
                out.push(' ');
                if let Some(prefix) = &qual.prefix {
                    out.push_str(prefix);
                    out.push(':');
                }
                out.push_str(&qual.local);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(name) {
                return;
            }
            if NEWLINE_EATERS.contains(&name) && starts_with_newline(node) {
                out.push('\n');
            }
            write_children(node, out);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::ProcessingInstruction(_) => {}
    }
}
