// ABOUTME: Scroll-position tracker that highlights the heading of the section being read.
// ABOUTME: Picks the last h2/h3 whose top offset is within the configured distance below the scroll position.

use crate::dom::{Document, NodeId, SECTION_HEADINGS};
use crate::host::Layout;
use crate::options::Options;

/// Tracks section headings of one container and flags the current one.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    headings: Vec<NodeId>,
    active: Option<NodeId>,
}

impl ScrollTracker {
    /// Collects the h2/h3 headings of `container` in document order.
    pub fn attach(doc: &Document, container: NodeId) -> Self {
        Self {
            headings: doc.select(container, &SECTION_HEADINGS),
            active: None,
        }
    }

    pub fn headings(&self) -> &[NodeId] {
        &self.headings
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// The last heading, in document order, whose top is at most
    /// `scroll_y + scroll_offset`.
    pub fn current(
        &self,
        doc: &Document,
        layout: &dyn Layout,
        scroll_y: f64,
        opts: &Options,
    ) -> Option<NodeId> {
        self.headings
            .iter()
            .copied()
            .filter(|h| scroll_y >= layout.offset_top(doc, *h) - opts.scroll_offset)
            .last()
    }

    /// Handles a scroll event: clears the active class from every tracked
    /// heading and sets it on the current one.
    pub fn on_scroll(
        &mut self,
        doc: &mut Document,
        layout: &dyn Layout,
        scroll_y: f64,
        opts: &Options,
    ) -> Option<NodeId> {
        if self.headings.is_empty() {
            return None;
        }

        let current = self.current(doc, layout, scroll_y, opts);
        for heading in &self.headings {
            doc.remove_class(*heading, &opts.active_class);
        }
        if let Some(heading) = current {
            doc.add_class(heading, &opts.active_class);
        }
        self.active = current;
        current
    }
}
