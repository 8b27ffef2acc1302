// ABOUTME: Smooth-scroll navigation for in-page anchor links.
// ABOUTME: Resolves the link fragment, scrolls to the target and records a history entry.

use tracing::debug;

use crate::dom::{Document, NodeId, IN_PAGE_LINKS};
use crate::host::{History, Layout, ScrollBehavior, Viewport};

/// What happened to a click on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not handled; the host's default navigation proceeds.
    Default,
    /// Default action suppressed without scrolling (bare `#`).
    Suppressed,
    /// Scrolled smoothly to `target` and pushed its fragment into history.
    Scrolled { target: NodeId },
}

impl ClickOutcome {
    pub fn default_prevented(&self) -> bool {
        !matches!(self, ClickOutcome::Default)
    }
}

/// In-page links of one container.
#[derive(Debug, Clone, Default)]
pub struct SmoothScroll {
    links: Vec<NodeId>,
}

impl SmoothScroll {
    /// Collects every `a` under `container` whose href starts with `#`.
    pub fn attach(doc: &Document, container: NodeId) -> Self {
        Self {
            links: doc.select(container, &IN_PAGE_LINKS),
        }
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    /// Handles a click on `link`.
    pub fn on_click(
        &self,
        doc: &Document,
        link: NodeId,
        layout: &dyn Layout,
        viewport: &dyn Viewport,
        history: &dyn History,
    ) -> ClickOutcome {
        if !self.links.contains(&link) {
            return ClickOutcome::Default;
        }
        let Some(href) = doc.attr(link, "href") else {
            return ClickOutcome::Default;
        };
        let Some(fragment) = href.strip_prefix('#') else {
            return ClickOutcome::Default;
        };
        if fragment.is_empty() {
            return ClickOutcome::Suppressed;
        }

        let Some(target) = doc.find_by_id(fragment) else {
            debug!(href, "anchor target missing, falling back to default navigation");
            return ClickOutcome::Default;
        };

        viewport.scroll_to(layout.offset_top(doc, target), ScrollBehavior::Smooth);
        history.push_state(href);
        ClickOutcome::Scrolled { target }
    }
}
