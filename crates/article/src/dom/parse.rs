// ABOUTME: Builds a Document from HTML text using scraper's html5ever parser.
// ABOUTME: Keeps scraper's tree as-is and records which node the serialized output starts from.

use scraper::Html;

use super::Document;

impl Document {
    /// Parses a complete HTML document (`<html>`, `<head>` and `<body>` are
    /// synthesized when missing).
    pub fn parse(html: &str) -> Self {
        let tree = Html::parse_document(html).tree;
        let root = tree.root().id();
        Self { tree, root }
    }

    /// Parses an HTML snippet. Output covers the snippet's top-level nodes
    /// only, without the `<html>` context element the parser adds.
    pub fn parse_fragment(html: &str) -> Self {
        let tree = Html::parse_fragment(html).tree;
        let root = tree
            .root()
            .children()
            .find(|child| child.value().is_element())
            .unwrap_or_else(|| tree.root())
            .id();
        Self { tree, root }
    }
}
