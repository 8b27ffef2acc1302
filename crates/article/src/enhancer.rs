// ABOUTME: ArticleEnhancer ties the five behaviors to one container and a host Environment.
// ABOUTME: Exposes event entry points (scroll, resize, click, copy, timers) and static HTML rendering.

use tracing::{debug, info};

use crate::behaviors::{
    link_headings, ClickOutcome, CodeBlock, CopyButtons, CopyState, ScrollTracker, SmoothScroll,
    TableChanges, TableWrapper,
};
use crate::dom::{Document, NodeId};
use crate::error::EnhanceError;
use crate::host::{AttrLayout, Environment, SimulatedViewport};
use crate::options::{EnhancerBuilder, Options};

/// Counts describing what an enhancer attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnhanceSummary {
    pub headings: usize,
    pub tracked_headings: usize,
    pub links: usize,
    pub code_blocks: usize,
    pub tables: usize,
    pub wrapped_tables: usize,
}

/// Page enhancements for one article container.
///
/// Owns the document while attached; every event handler mutates it in place.
/// Get it back with [`ArticleEnhancer::into_document`].
pub struct ArticleEnhancer {
    doc: Document,
    container: Option<NodeId>,
    opts: Options,
    env: Environment,
    headings: Vec<NodeId>,
    tracker: ScrollTracker,
    nav: SmoothScroll,
    copy: CopyButtons,
    tables: TableWrapper,
}

impl ArticleEnhancer {
    pub fn builder() -> EnhancerBuilder {
        EnhancerBuilder::new()
    }

    /// Attaches with default options to the first `.article-content` element.
    pub fn attach(doc: Document, env: Environment) -> Self {
        Self::attach_with(doc, env, Options::default())
    }

    /// Attaches to the first element carrying `opts.container_class`.
    pub fn attach_with(doc: Document, env: Environment, opts: Options) -> Self {
        let container = doc.find_by_class(doc.root(), &opts.container_class);
        if container.is_none() {
            debug!(class = %opts.container_class, "no article container, nothing to enhance");
        }
        Self::attach_to(doc, container, env, opts)
    }

    /// Attaches to `container`; `None` leaves every behavior inert.
    ///
    /// Setup runs heading links, scroll tracking, smooth scroll, copy buttons
    /// and the initial table pass, in that order.
    pub fn attach_to(
        mut doc: Document,
        container: Option<NodeId>,
        env: Environment,
        opts: Options,
    ) -> Self {
        let mut enhancer = match container {
            Some(c) => {
                let headings = link_headings(&mut doc, c, &opts);
                let tracker = ScrollTracker::attach(&doc, c);
                let nav = SmoothScroll::attach(&doc, c);
                let copy = CopyButtons::attach(&mut doc, c, &opts);
                let tables = TableWrapper::attach(&doc, c);
                Self {
                    doc,
                    container,
                    opts,
                    env,
                    headings,
                    tracker,
                    nav,
                    copy,
                    tables,
                }
            }
            None => Self {
                doc,
                container: None,
                opts,
                env,
                headings: Vec::new(),
                tracker: ScrollTracker::default(),
                nav: SmoothScroll::default(),
                copy: CopyButtons::default(),
                tables: TableWrapper::default(),
            },
        };
        enhancer.on_resize();
        enhancer
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn headings(&self) -> &[NodeId] {
        &self.headings
    }

    pub fn active_heading(&self) -> Option<NodeId> {
        self.tracker.active()
    }

    pub fn links(&self) -> &[NodeId] {
        self.nav.links()
    }

    pub fn code_blocks(&self) -> &[CodeBlock] {
        self.copy.blocks()
    }

    pub fn tables(&self) -> &[NodeId] {
        self.tables.tables()
    }

    pub fn summary(&self) -> EnhanceSummary {
        EnhanceSummary {
            headings: self.headings.len(),
            tracked_headings: self.tracker.headings().len(),
            links: self.nav.links().len(),
            code_blocks: self.copy.blocks().len(),
            tables: self.tables.tables().len(),
            wrapped_tables: self
                .tables
                .tables()
                .iter()
                .filter(|t| self.tables.wrapper_of(&self.doc, **t, &self.opts).is_some())
                .count(),
        }
    }

    /// Runs the heading linker again. With the duplicate guard enabled this
    /// changes nothing for headings linked before.
    pub fn relink_headings(&mut self) -> &[NodeId] {
        if let Some(c) = self.container {
            self.headings = link_headings(&mut self.doc, c, &self.opts);
        }
        &self.headings
    }

    /// Scroll event: updates the active heading from the viewport position.
    pub fn on_scroll(&mut self) -> Option<NodeId> {
        let scroll_y = self.env.viewport.scroll_y();
        self.tracker
            .on_scroll(&mut self.doc, &*self.env.layout, scroll_y, &self.opts)
    }

    /// Resize event: wraps or unwraps tables for the current viewport width.
    pub fn on_resize(&mut self) -> TableChanges {
        self.tables.apply(
            &mut self.doc,
            &*self.env.layout,
            &*self.env.viewport,
            &self.opts,
        )
    }

    /// Click event on `link`.
    pub fn on_click(&mut self, link: NodeId) -> ClickOutcome {
        self.nav.on_click(
            &self.doc,
            link,
            &*self.env.layout,
            &*self.env.viewport,
            &*self.env.history,
        )
    }

    /// Click on a copy button (or its code block).
    ///
    /// Clipboard failures are logged and shown on the button; they yield
    /// `Ok(CopyState::Failed)`. Only an unknown `target` is an error.
    pub async fn copy_code(&mut self, target: NodeId) -> Result<CopyState, EnhanceError> {
        let index = self
            .copy
            .position(target)
            .ok_or_else(|| EnhanceError::not_found(format!("{:?}", target), "copy_code"))?;
        let text = self.copy.code_text(&self.doc, index).unwrap_or_default();

        let result = self.env.clipboard.write_text(text).await;
        let now = self.env.clock.now();
        let state = self
            .copy
            .finish(&mut self.doc, index, result, now, &self.opts)
            .ok_or_else(|| EnhanceError::not_found(format!("{:?}", target), "copy_code"))?;
        Ok(state)
    }

    /// Current feedback state of the copy button owning `target`.
    pub fn copy_state(&self, target: NodeId) -> Option<CopyState> {
        self.copy.position(target).and_then(|i| self.copy.state(i))
    }

    /// Fires revert timers that are due according to the environment clock.
    pub fn run_timers(&mut self) -> usize {
        let now = self.env.clock.now();
        self.copy.run_due(&mut self.doc, now, &self.opts)
    }

    pub fn pending_timers(&self) -> usize {
        self.copy.pending_timers()
    }

    /// Sleeps on the tokio timer until every pending revert has fired.
    ///
    /// Stops early if the environment clock does not move with tokio's timer
    /// (a manual clock), leaving the remaining timers pending.
    pub async fn settle(&mut self) {
        while let Some(due) = self.copy.next_deadline() {
            let now = self.env.clock.now();
            if due > now {
                tokio::time::sleep(due - now).await;
            }
            if self.run_timers() == 0 {
                break;
            }
        }
    }
}

/// Enhances an HTML page (or fragment) once, as a build step would.
///
/// Layout comes from element attributes (see [`AttrLayout`]) and the viewport
/// is fixed at `viewport_width`. Interactive behaviors have nothing to do in
/// this mode; their markup (anchors, buttons, wrappers) is still emitted.
pub fn enhance_html(
    html: &str,
    opts: &Options,
    viewport_width: f64,
    fragment: bool,
) -> (String, EnhanceSummary) {
    let doc = if fragment {
        Document::parse_fragment(html)
    } else {
        Document::parse(html)
    };
    let env = Environment::new(SimulatedViewport::new(viewport_width), AttrLayout);
    let enhancer = ArticleEnhancer::attach_with(doc, env, opts.clone());
    let summary = enhancer.summary();
    info!(
        headings = summary.headings,
        code_blocks = summary.code_blocks,
        tables = summary.tables,
        wrapped_tables = summary.wrapped_tables,
        "enhanced article"
    );
    (enhancer.into_document().to_html(), summary)
}
