// ABOUTME: Responsive table wrapper toggling a horizontal-scroll container around oversized tables.
// ABOUTME: Wraps tables wider than the viewport minus a margin and unwraps them once they fit.

use tracing::debug;

use crate::dom::{Document, NodeId, TABLES};
use crate::host::{Layout, Viewport};
use crate::options::Options;

/// Tables wrapped and unwrapped by one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableChanges {
    pub wrapped: Vec<NodeId>,
    pub unwrapped: Vec<NodeId>,
}

impl TableChanges {
    pub fn is_empty(&self) -> bool {
        self.wrapped.is_empty() && self.unwrapped.is_empty()
    }
}

/// Tables of one container.
#[derive(Debug, Clone, Default)]
pub struct TableWrapper {
    tables: Vec<NodeId>,
}

/// True when `table` is the only content of `wrapper`, apart from whitespace.
fn wraps_only(doc: &Document, wrapper: NodeId, table: NodeId) -> bool {
    doc.children(wrapper).into_iter().all(|child| {
        child == table
            || doc
                .node(child)
                .and_then(|n| n.as_text())
                .is_some_and(|t| t.trim().is_empty())
    })
}

impl TableWrapper {
    pub fn attach(doc: &Document, container: NodeId) -> Self {
        Self {
            tables: doc.select(container, &TABLES),
        }
    }

    pub fn tables(&self) -> &[NodeId] {
        &self.tables
    }

    /// The wrapper around `table`, if it currently has one.
    pub fn wrapper_of(&self, doc: &Document, table: NodeId, opts: &Options) -> Option<NodeId> {
        doc.parent(table)
            .filter(|parent| doc.has_class(*parent, &opts.wrapper_class))
    }

    /// Brings every table in line with the current viewport width.
    /// Repeated calls at the same width change nothing.
    ///
    /// A table that fits leaves its wrapper. The wrapper itself is removed
    /// only when the table was all it held; other content stays in place.
    pub fn apply(
        &self,
        doc: &mut Document,
        layout: &dyn Layout,
        viewport: &dyn Viewport,
        opts: &Options,
    ) -> TableChanges {
        let limit = viewport.inner_width() - opts.table_margin;
        let mut changes = TableChanges::default();

        for table in self.tables.iter().copied() {
            if doc.parent(table).is_none() {
                continue;
            }
            let too_wide = layout.offset_width(doc, table) > limit;
            match (self.wrapper_of(doc, table, opts), too_wide) {
                (None, true) => {
                    let wrapper = doc.create_element(
                        "div",
                        &[
                            ("class", opts.wrapper_class.as_str()),
                            ("style", opts.wrapper_style.as_str()),
                        ],
                    );
                    doc.insert_before(table, wrapper);
                    doc.append_child(wrapper, table);
                    changes.wrapped.push(table);
                }
                (Some(wrapper), false) => {
                    let remove_wrapper = wraps_only(doc, wrapper, table);
                    doc.insert_before(wrapper, table);
                    if remove_wrapper {
                        doc.detach(wrapper);
                    }
                    changes.unwrapped.push(table);
                }
                _ => {}
            }
        }

        if !changes.is_empty() {
            debug!(
                wrapped = changes.wrapped.len(),
                unwrapped = changes.unwrapped.len(),
                limit,
                "updated table wrappers"
            );
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AttrLayout, SimulatedViewport};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Document, TableWrapper) {
        let doc = Document::parse_fragment(
            r#"<div class="article-content"><p>before</p><table id="wide" width="900"></table><table id="narrow" width="300"></table></div>"#,
        );
        let c = doc.find_by_class(doc.root(), "article-content").unwrap();
        let tables = TableWrapper::attach(&doc, c);
        (doc, tables)
    }

    #[test]
    fn test_wraps_only_oversized_tables() {
        let (mut doc, tables) = fixture();
        let opts = Options::default();
        let vp = SimulatedViewport::new(800.0);
        let wide = doc.find_by_id("wide").unwrap();

        let changes = tables.apply(&mut doc, &AttrLayout, &vp, &opts);
        assert_eq!(changes.wrapped, vec![wide]);
        assert_eq!(
            doc.to_html(),
            r#"<div class="article-content"><p>before</p><div class="table-responsive-wrapper" style="overflow-x: auto; margin-bottom: 20px"><table id="wide" width="900"></table></div><table id="narrow" width="300"></table></div>"#
        );
    }

    #[test]
    fn test_repeated_apply_is_idempotent() {
        let (mut doc, tables) = fixture();
        let opts = Options::default();
        let vp = SimulatedViewport::new(800.0);
        tables.apply(&mut doc, &AttrLayout, &vp, &opts);
        let html = doc.to_html();

        for _ in 0..3 {
            assert!(tables.apply(&mut doc, &AttrLayout, &vp, &opts).is_empty());
        }
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let (mut doc, tables) = fixture();
        let opts = Options::default();
        // 940 - 40 = 900: a 900px table fits exactly
        let vp = SimulatedViewport::new(940.0);
        assert!(tables.apply(&mut doc, &AttrLayout, &vp, &opts).is_empty());
    }

    #[test]
    fn test_unwraps_when_viewport_grows() {
        let (mut doc, tables) = fixture();
        let original = doc.to_html();
        let opts = Options::default();
        let vp = SimulatedViewport::new(800.0);
        let wide = doc.find_by_id("wide").unwrap();

        tables.apply(&mut doc, &AttrLayout, &vp, &opts);
        vp.set_inner_width(1200.0);
        let changes = tables.apply(&mut doc, &AttrLayout, &vp, &opts);
        assert_eq!(changes.unwrapped, vec![wide]);
        assert_eq!(doc.to_html(), original);

        assert!(tables.apply(&mut doc, &AttrLayout, &vp, &opts).is_empty());
        assert_eq!(tables.wrapper_of(&doc, wide, &opts), None);
    }

    #[test]
    fn test_prewrapped_table_is_not_wrapped_again() {
        let mut doc = Document::parse_fragment(
            r#"<div class="article-content"><div class="table-responsive-wrapper"><table width="900"></table></div></div>"#,
        );
        let c = doc.find_by_class(doc.root(), "article-content").unwrap();
        let tables = TableWrapper::attach(&doc, c);
        let html = doc.to_html();
        let vp = SimulatedViewport::new(320.0);
        assert!(tables
            .apply(&mut doc, &AttrLayout, &vp, &Options::default())
            .is_empty());
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_unwrap_keeps_wrapper_with_other_content() {
        let mut doc = Document::parse_fragment(
            r#"<div class="article-content"><div class="table-responsive-wrapper"><p>Table 1: results</p><table width="300"></table></div></div>"#,
        );
        let c = doc.find_by_class(doc.root(), "article-content").unwrap();
        let tables = TableWrapper::attach(&doc, c);
        let vp = SimulatedViewport::new(1024.0);

        let changes = tables.apply(&mut doc, &AttrLayout, &vp, &Options::default());
        assert_eq!(changes.unwrapped.len(), 1);
        assert_eq!(
            doc.to_html(),
            r#"<div class="article-content"><table width="300"></table><div class="table-responsive-wrapper"><p>Table 1: results</p></div></div>"#
        );
        assert!(tables
            .apply(&mut doc, &AttrLayout, &vp, &Options::default())
            .is_empty());
    }

    #[test]
    fn test_unwrap_removes_wrapper_holding_only_whitespace() {
        let mut doc = Document::parse_fragment(
            "<div class=\"article-content\"><div class=\"table-responsive-wrapper\">\n  <table width=\"300\"></table>\n</div></div>",
        );
        let c = doc.find_by_class(doc.root(), "article-content").unwrap();
        let tables = TableWrapper::attach(&doc, c);
        let vp = SimulatedViewport::new(1024.0);

        tables.apply(&mut doc, &AttrLayout, &vp, &Options::default());
        assert_eq!(
            doc.to_html(),
            r#"<div class="article-content"><table width="300"></table></div>"#
        );
    }
}
