// ABOUTME: Host abstractions standing in for browser globals: viewport, layout, history, clipboard, clock.
// ABOUTME: Includes in-memory implementations used by the static renderer and by tests.

//! Host services consumed by the enhancer.
//!
//! Each trait covers one piece of page-global state the behaviors need. The
//! enhancer only ever talks to these traits, so the same code runs against a
//! real embedding or against the simulated implementations below.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{self, BoxFuture, FutureExt};

use crate::dom::{Document, NodeId};
use crate::error::ClipboardError;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How a programmatic scroll is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScrollBehavior {
    Smooth,
}

/// Page scroll position and viewport size.
pub trait Viewport: Send + Sync {
    /// Vertical scroll offset in CSS pixels.
    fn scroll_y(&self) -> f64;

    /// Viewport width in CSS pixels.
    fn inner_width(&self) -> f64;

    /// Scrolls the page so that `top` is at the top of the viewport.
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);
}

/// Rendered geometry of elements.
pub trait Layout: Send + Sync {
    /// Distance from the top of the page to the element's border box.
    fn offset_top(&self, doc: &Document, node: NodeId) -> f64;

    /// Rendered width of the element.
    fn offset_width(&self, doc: &Document, node: NodeId) -> f64;
}

/// Session history.
pub trait History: Send + Sync {
    /// Adds an entry for `url` without navigating.
    fn push_state(&self, url: &str);
}

/// System clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), ClipboardError>>;
}

/// Monotonic time source for feedback timers.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The set of host services an enhancer runs against.
pub struct Environment {
    pub viewport: Box<dyn Viewport>,
    pub layout: Box<dyn Layout>,
    pub history: Box<dyn History>,
    pub clipboard: Box<dyn Clipboard>,
    pub clock: Box<dyn Clock>,
}

impl Environment {
    /// Environment with an in-memory history, no clipboard and the tokio clock.
    pub fn new(viewport: impl Viewport + 'static, layout: impl Layout + 'static) -> Self {
        Self {
            viewport: Box::new(viewport),
            layout: Box::new(layout),
            history: Box::new(MemoryHistory::default()),
            clipboard: Box::new(NoClipboard),
            clock: Box::new(TokioClock),
        }
    }

    pub fn with_history(mut self, history: impl History + 'static) -> Self {
        self.history = Box::new(history);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

#[derive(Debug, Default)]
struct ViewportState {
    scroll_y: f64,
    inner_width: f64,
    scrolls: Vec<(f64, ScrollBehavior)>,
}

/// Viewport whose position and size are set by the caller. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedViewport {
    state: Arc<Mutex<ViewportState>>,
}

impl SimulatedViewport {
    pub fn new(inner_width: f64) -> Self {
        let vp = Self::default();
        vp.set_inner_width(inner_width);
        vp
    }

    pub fn set_scroll_y(&self, y: f64) {
        lock(&self.state).scroll_y = y;
    }

    pub fn set_inner_width(&self, width: f64) {
        lock(&self.state).inner_width = width;
    }

    /// Every `scroll_to` request received so far.
    pub fn scroll_requests(&self) -> Vec<(f64, ScrollBehavior)> {
        lock(&self.state).scrolls.clone()
    }
}

impl Viewport for SimulatedViewport {
    fn scroll_y(&self) -> f64 {
        lock(&self.state).scroll_y
    }

    fn inner_width(&self) -> f64 {
        lock(&self.state).inner_width
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let mut state = lock(&self.state);
        state.scroll_y = top;
        state.scrolls.push((top, behavior));
    }
}

/// Layout read from element attributes.
///
/// `data-offset-top` gives the top offset. Width comes from
/// `data-offset-width`, falling back to a numeric `width` attribute. Missing or
/// unparsable values count as `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttrLayout;

pub const OFFSET_TOP_ATTR: &str = "data-offset-top";
pub const OFFSET_WIDTH_ATTR: &str = "data-offset-width";

fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    trimmed.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Layout for AttrLayout {
    fn offset_top(&self, doc: &Document, node: NodeId) -> f64 {
        doc.attr(node, OFFSET_TOP_ATTR)
            .and_then(parse_px)
            .unwrap_or(0.0)
    }

    fn offset_width(&self, doc: &Document, node: NodeId) -> f64 {
        doc.attr(node, OFFSET_WIDTH_ATTR)
            .and_then(parse_px)
            .or_else(|| doc.attr(node, "width").and_then(parse_px))
            .unwrap_or(0.0)
    }
}

/// History that records pushed URLs. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryHistory {
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }
}

impl History for MemoryHistory {
    fn push_state(&self, url: &str) {
        lock(&self.entries).push(url.to_string());
    }
}

/// Clipboard kept in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    reject: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    /// A clipboard that rejects every write with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        let clipboard = Self::default();
        clipboard.set_rejection(Some(reason.into()));
        clipboard
    }

    /// Makes subsequent writes fail (`Some`) or succeed (`None`).
    pub fn set_rejection(&self, reason: Option<String>) {
        *lock(&self.reject) = reason;
    }

    pub fn contents(&self) -> Option<String> {
        lock(&self.contents).clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), ClipboardError>> {
        let contents = Arc::clone(&self.contents);
        let reject = lock(&self.reject).clone();
        async move {
            if let Some(reason) = reject {
                return Err(ClipboardError::Rejected(reason));
            }
            *lock(&contents) = Some(text);
            Ok(())
        }
        .boxed()
    }
}

/// Clipboard for hosts without one; every write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&self, _text: String) -> BoxFuture<'static, Result<(), ClipboardError>> {
        future::ready(Err(ClipboardError::Unavailable)).boxed()
    }
}

/// Wall clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock following tokio's timer, so paused-time tests advance it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Clock that only moves when told to. Clones share state.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *lock(&self.now) += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_layout_reads_offsets() {
        let doc = Document::parse_fragment(
            r#"<h2 data-offset-top="420">A</h2><table width="900"></table><table data-offset-width="12.5px" width="900"></table><p data-offset-top="oops"></p>"#,
        );
        let kids = doc.element_children(doc.root());
        let (h2, t1, t2, p) = (kids[0], kids[1], kids[2], kids[3]);

        assert_eq!(AttrLayout.offset_top(&doc, h2), 420.0);
        assert_eq!(AttrLayout.offset_width(&doc, t1), 900.0);
        assert_eq!(AttrLayout.offset_width(&doc, t2), 12.5);
        assert_eq!(AttrLayout.offset_top(&doc, p), 0.0);
    }

    #[test]
    fn test_simulated_viewport_records_scrolls() {
        let vp = SimulatedViewport::new(800.0);
        let shared = vp.clone();
        vp.scroll_to(300.0, ScrollBehavior::Smooth);
        assert_eq!(shared.scroll_y(), 300.0);
        assert_eq!(shared.inner_width(), 800.0);
        assert_eq!(
            shared.scroll_requests(),
            vec![(300.0, ScrollBehavior::Smooth)]
        );
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.clone().advance(Duration::from_millis(1500));
        assert_eq!(clock.now() - start, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_memory_clipboard_write_and_reject() {
        let clipboard = MemoryClipboard::default();
        clipboard.write_text("fn main() {}".into()).await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("fn main() {}"));

        clipboard.set_rejection(Some("denied".into()));
        let err = clipboard.write_text("x".into()).await.unwrap_err();
        assert_eq!(err, ClipboardError::Rejected("denied".into()));
        assert_eq!(clipboard.contents().as_deref(), Some("fn main() {}"));
    }

    #[tokio::test]
    async fn test_no_clipboard_is_unavailable() {
        assert_eq!(
            NoClipboard.write_text("x".into()).await,
            Err(ClipboardError::Unavailable)
        );
    }
}
