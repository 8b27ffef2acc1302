// ABOUTME: Mutable HTML document used by the article enhancer, backed by scraper's ego_tree.
// ABOUTME: Adds id-addressed attribute, class, query and tree-edit helpers over the parsed tree.

//! In-memory document model.
//!
//! A [`Document`] owns the `ego_tree::Tree<scraper::Node>` produced by the
//! html5ever parser and edits it in place. Nodes are addressed by the tree's
//! copyable [`NodeId`]. Detached nodes stay in the tree as orphans and are no
//! longer reachable from the root, which mirrors how removed DOM elements
//! behave.

mod parse;
mod serialize;

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use once_cell::sync::Lazy;
use scraper::node::{Element, Text};
use scraper::{CaseSensitivity, ElementRef, Node, Selector};

pub use ego_tree::NodeId;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

pub(crate) static HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
pub(crate) static SECTION_HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3").unwrap());
pub(crate) static IN_PAGE_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href^='#']").unwrap());
pub(crate) static CODE_BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("pre").unwrap());
pub(crate) static CODE: Lazy<Selector> = Lazy::new(|| Selector::parse("code").unwrap());
pub(crate) static TABLES: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
pub(crate) static WITH_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").unwrap());

fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

/// Parsed HTML document, editable in place.
#[derive(Debug, Clone)]
pub struct Document {
    tree: ego_tree::Tree<Node>,
    root: NodeId,
}

impl Document {
    /// The node whose children make up the serialized output: the document
    /// node for pages, the implicit `<html>` context element for fragments.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id).map(|n| n.value())
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.tree.get(id).and_then(ElementRef::wrap)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.value().name())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.value().attr(name))
    }

    /// The `id` attribute of `id`, treating an empty value as absent.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.value().id())
            .filter(|v| !v.is_empty())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|el| el.value().has_class(class, CaseSensitivity::CaseSensitive))
    }

    /// Rebuilds the element at `id` with edited attributes. scraper caches the
    /// id and class list per element, so attributes are never edited in place.
    fn edit_attrs(&mut self, id: NodeId, edit: impl FnOnce(&mut Vec<Attribute>)) {
        let Some(mut node) = self.tree.get_mut(id) else {
            return;
        };
        let Node::Element(el) = node.value() else {
            return;
        };
        let mut attrs: Vec<Attribute> = el
            .attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        edit(&mut attrs);
        *el = Element::new(el.name.clone(), attrs);
    }

    /// Sets an attribute, replacing the previous value in place.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = StrTendril::from(value.into());
        let name = attr_name(name);
        self.edit_attrs(id, move |attrs| {
            match attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute { name, value }),
            }
        });
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.element(id).is_none() || self.has_class(id, class) {
            return;
        }
        let joined = match self.attr(id, "class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", joined);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let remaining: Vec<&str> = self
            .attr(id, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        let joined = remaining.join(" ");
        self.set_attr(id, "class", joined);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|p| p.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    /// Element children only, in order.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|n| n.children().filter_map(ElementRef::wrap).map(|el| el.id()).collect())
            .unwrap_or_default()
    }

    /// Descendant elements of `scope` matching `selector`, in document order.
    /// `scope` itself is never included.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let Some(node) = self.tree.get(scope) else {
            return Vec::new();
        };
        node.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| el.id())
            .collect()
    }

    /// First descendant element of `scope` carrying `class`.
    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.tree
            .get(scope)?
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().has_class(class, CaseSensitivity::CaseSensitive))
            .map(|el| el.id())
    }

    /// First attached element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.tree
            .get(self.root)?
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
            .map(|el| el.id())
    }

    /// True when `id` is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.is_ancestor(self.root, id)
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree
            .get(node)
            .is_some_and(|n| n.ancestors().any(|a| a.id() == ancestor))
    }

    /// Creates a detached HTML element with the given attributes.
    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let name = QualName::new(
            None,
            Namespace::from(HTML_NS),
            LocalName::from(name.to_ascii_lowercase()),
        );
        let attrs = attrs
            .iter()
            .map(|(k, v)| Attribute {
                name: attr_name(k),
                value: StrTendril::from(*v),
            })
            .collect();
        self.tree.orphan(Node::Element(Element::new(name, attrs))).id()
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let text = Text {
            text: StrTendril::from(text.into()),
        };
        self.tree.orphan(Node::Text(text)).id()
    }

    /// Removes `id` from its parent. The node and its subtree stay usable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Appends `child` as the last child of `parent`, moving it if attached
    /// elsewhere. Refuses moves that would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.is_ancestor(child, parent) || self.tree.get(child).is_none() {
            return;
        }
        if let Some(mut node) = self.tree.get_mut(parent) {
            node.append_id(child);
        }
    }

    /// Inserts `node` immediately before `reference` under the same parent.
    /// No-op when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if reference == node || self.is_ancestor(node, reference) || self.tree.get(node).is_none()
        {
            return;
        }
        let Some(current) = self.tree.get(reference) else {
            return;
        };
        if current.parent().is_none() {
            return;
        }
        if current.prev_sibling().map(|s| s.id()) == Some(node) {
            return;
        }
        if let Some(mut reference) = self.tree.get_mut(reference) {
            reference.insert_id_before(node);
        }
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        for child in self.children(id) {
            self.detach(child);
        }
        let text = self.create_text(text);
        self.append_child(id, text);
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_content_excluding(id, &[])
    }

    /// Like [`Document::text_content`] but skipping the subtrees rooted at `skip`.
    pub fn text_content_excluding(&self, id: NodeId, skip: &[NodeId]) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            collect_text(node, skip, &mut out);
        }
        out
    }
}

fn collect_text(node: ego_tree::NodeRef<'_, Node>, skip: &[NodeId], out: &mut String) {
    if skip.contains(&node.id()) {
        return;
    }
    if let Node::Text(text) = node.value() {
        out.push_str(text);
    }
    for child in node.children() {
        collect_text(child, skip, out);
    }
}
