// ABOUTME: Integration tests for ArticleEnhancer driven through simulated host services.
// ABOUTME: Covers setup, scroll/resize/click events, clipboard feedback timers and static rendering.

use std::collections::HashSet;
use std::time::Duration;

use folio_article::{
    enhance_html, ArticleEnhancer, AttrLayout, ClickOutcome, CopyState, Document, Environment,
    ManualClock, MemoryClipboard, MemoryHistory, Options, ScrollBehavior, SimulatedViewport,
    TokioClock,
};
use pretty_assertions::assert_eq;

const ARTICLE: &str = r##"<!DOCTYPE html>
<html><head><title>Post</title></head><body>
<nav><a id="skip" href="#heading-1">Skip</a></nav>
<div class="article-content">
  <h1 data-offset-top="0">Title</h1>
  <p><a id="toc-setup" href="#setup">Setup</a> <a id="top" href="#">Top</a> <a id="gone" href="#missing">Gone</a></p>
  <h2 data-offset-top="300">Overview</h2>
  <h2 id="setup" data-offset-top="900">Setup</h2>
  <pre><code>cargo install folio</code></pre>
  <h3 data-offset-top="1500">Details</h3>
  <table id="wide" data-offset-width="980"><tr><td>a</td></tr></table>
  <table id="narrow" data-offset-width="400"><tr><td>b</td></tr></table>
  <pre>echo plain</pre>
</div>
</body></html>"##;

struct Harness {
    enhancer: ArticleEnhancer,
    viewport: SimulatedViewport,
    history: MemoryHistory,
    clipboard: MemoryClipboard,
    clock: ManualClock,
}

fn harness(width: f64) -> Harness {
    let viewport = SimulatedViewport::new(width);
    let history = MemoryHistory::default();
    let clipboard = MemoryClipboard::default();
    let clock = ManualClock::new();
    let env = Environment::new(viewport.clone(), AttrLayout)
        .with_history(history.clone())
        .with_clipboard(clipboard.clone())
        .with_clock(clock.clone());
    let enhancer = ArticleEnhancer::attach(Document::parse(ARTICLE), env);
    Harness {
        enhancer,
        viewport,
        history,
        clipboard,
        clock,
    }
}

fn by_id(enhancer: &ArticleEnhancer, id: &str) -> folio_article::NodeId {
    enhancer
        .document()
        .find_by_id(id)
        .unwrap_or_else(|| panic!("no element #{}", id))
}

fn text(enhancer: &ArticleEnhancer, node: folio_article::NodeId) -> String {
    enhancer.document().text_content(node)
}

#[test]
fn attach_links_every_heading_once() {
    let mut h = harness(1280.0);
    let doc = h.enhancer.document();

    let ids: Vec<String> = h
        .enhancer
        .headings()
        .iter()
        .map(|n| doc.attr(*n, "id").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["heading-0", "heading-1", "setup", "heading-3"]);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

    let before = h.enhancer.document().to_html();
    h.enhancer.relink_headings();
    assert_eq!(h.enhancer.document().to_html(), before);

    let doc = h.enhancer.document();
    for heading in h.enhancer.headings() {
        let anchors = doc
            .element_children(*heading)
            .into_iter()
            .filter(|c| doc.has_class(*c, "heading-anchor"))
            .count();
        assert_eq!(anchors, 1);
    }
}

#[test]
fn scroll_highlights_single_current_section() {
    let mut h = harness(1280.0);

    h.viewport.set_scroll_y(750.0);
    let current = h.enhancer.on_scroll().unwrap();
    assert_eq!(h.enhancer.document().attr(current, "id"), Some("setup"));

    h.viewport.set_scroll_y(120.0);
    let current = h.enhancer.on_scroll().unwrap();
    assert_eq!(h.enhancer.document().attr(current, "id"), Some("heading-1"));

    let doc = h.enhancer.document();
    let active: Vec<_> = h
        .enhancer
        .headings()
        .iter()
        .filter(|n| doc.has_class(**n, "active"))
        .collect();
    assert_eq!(active, vec![&current]);
    assert_eq!(h.enhancer.active_heading(), Some(current));
}

#[test]
fn clicking_links_scrolls_and_records_history() {
    let mut h = harness(1280.0);

    let outcome = h.enhancer.on_click(by_id(&h.enhancer, "toc-setup"));
    assert_eq!(
        outcome,
        ClickOutcome::Scrolled {
            target: by_id(&h.enhancer, "setup")
        }
    );
    assert_eq!(
        h.viewport.scroll_requests(),
        vec![(900.0, ScrollBehavior::Smooth)]
    );
    assert_eq!(h.history.entries(), vec!["#setup".to_string()]);

    // heading anchors created during setup are tracked too
    let overview = h.enhancer.headings()[1];
    let anchor = *h.enhancer.document().element_children(overview).last().unwrap();
    assert!(h.enhancer.on_click(anchor).default_prevented());
    assert_eq!(h.history.entries().len(), 2);

    assert_eq!(
        h.enhancer.on_click(by_id(&h.enhancer, "top")),
        ClickOutcome::Suppressed
    );
    assert_eq!(
        h.enhancer.on_click(by_id(&h.enhancer, "gone")),
        ClickOutcome::Default
    );
    // links outside the container are not handled
    assert_eq!(
        h.enhancer.on_click(by_id(&h.enhancer, "skip")),
        ClickOutcome::Default
    );
    assert_eq!(h.history.entries().len(), 2);
}

#[test]
fn tables_follow_viewport_width() {
    let mut h = harness(800.0);
    let wide = by_id(&h.enhancer, "wide");
    let narrow = by_id(&h.enhancer, "narrow");
    let doc = h.enhancer.document();
    let parent = doc.parent(wide).unwrap();
    assert!(doc.has_class(parent, "table-responsive-wrapper"));
    assert!(!doc.has_class(doc.parent(narrow).unwrap(), "table-responsive-wrapper"));

    assert!(h.enhancer.on_resize().is_empty());

    h.viewport.set_inner_width(1400.0);
    let changes = h.enhancer.on_resize();
    assert_eq!(changes.unwrapped, vec![wide]);
    assert!(h.enhancer.on_resize().is_empty());
    let doc = h.enhancer.document();
    assert!(doc.has_class(doc.parent(wide).unwrap(), "article-content"));

    h.viewport.set_inner_width(600.0);
    let changes = h.enhancer.on_resize();
    assert_eq!(changes.wrapped, vec![wide]);
}

#[tokio::test]
async fn copy_success_reverts_after_two_seconds() {
    let mut h = harness(1280.0);
    let block = h.enhancer.code_blocks()[0].clone();

    let state = h.enhancer.copy_code(block.button).await.unwrap();
    assert_eq!(state, CopyState::Copied);
    assert_eq!(h.clipboard.contents().as_deref(), Some("cargo install folio"));
    assert_eq!(text(&h.enhancer, block.button), "Copied!");

    h.clock.advance(Duration::from_millis(1999));
    assert_eq!(h.enhancer.run_timers(), 0);
    assert_eq!(text(&h.enhancer, block.button), "Copied!");

    h.clock.advance(Duration::from_millis(1));
    assert_eq!(h.enhancer.run_timers(), 1);
    assert_eq!(text(&h.enhancer, block.button), "Copy Code");
    assert_eq!(h.enhancer.copy_state(block.block), Some(CopyState::Idle));
}

#[tokio::test]
async fn copy_failure_sticks() {
    let mut h = harness(1280.0);
    h.clipboard.set_rejection(Some("permission denied".into()));
    let block = h.enhancer.code_blocks()[1].clone();

    let state = h.enhancer.copy_code(block.block).await.unwrap();
    assert_eq!(state, CopyState::Failed);
    assert_eq!(h.enhancer.pending_timers(), 0);

    h.clock.advance(Duration::from_secs(10));
    h.enhancer.run_timers();
    assert_eq!(text(&h.enhancer, block.button), "Copy Failed");
}

#[tokio::test]
async fn copy_unknown_target_is_not_found() {
    let mut h = harness(1280.0);
    let heading = h.enhancer.headings()[0];
    let err = h.enhancer.copy_code(heading).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn settle_waits_for_revert_on_tokio_clock() {
    let clipboard = MemoryClipboard::default();
    let env = Environment::new(SimulatedViewport::new(1280.0), AttrLayout)
        .with_clipboard(clipboard.clone())
        .with_clock(TokioClock);
    let mut enhancer = ArticleEnhancer::builder()
        .copy_reset(Duration::from_millis(2000))
        .attach(Document::parse(ARTICLE), env);
    let button = enhancer.code_blocks()[1].button;

    let start = tokio::time::Instant::now();
    enhancer.copy_code(button).await.unwrap();
    assert_eq!(clipboard.contents().as_deref(), Some("echo plain"));

    enhancer.settle().await;
    assert!(start.elapsed() >= Duration::from_millis(2000));
    assert_eq!(enhancer.pending_timers(), 0);
    assert_eq!(enhancer.document().text_content(button), "Copy Code");
}

#[test]
fn missing_container_is_inert() {
    let env = Environment::new(SimulatedViewport::new(320.0), AttrLayout);
    let html = r#"<main><h2>x</h2><table width="2000"></table><pre>p</pre></main>"#;
    let mut enhancer = ArticleEnhancer::attach(Document::parse_fragment(html), env);

    assert_eq!(enhancer.container(), None);
    assert_eq!(enhancer.on_scroll(), None);
    assert!(enhancer.on_resize().is_empty());
    assert_eq!(enhancer.into_document().to_html(), html);
}

#[test]
fn builder_respects_custom_container_class() {
    let env = Environment::new(SimulatedViewport::new(1024.0), AttrLayout);
    let enhancer = ArticleEnhancer::builder()
        .container_class("post-body")
        .heading_id_prefix("sec-")
        .attach(
            Document::parse_fragment(r#"<section class="post-body"><h2>A</h2></section>"#),
            env,
        );
    let heading = enhancer.headings()[0];
    assert_eq!(enhancer.document().attr(heading, "id"), Some("sec-0"));
}

#[test]
fn static_render_emits_enhanced_markup() {
    let (html, summary) = enhance_html(ARTICLE, &Options::default(), 800.0, false);
    assert_eq!(summary.headings, 4);
    assert_eq!(summary.tracked_headings, 3);
    assert_eq!(summary.code_blocks, 2);
    assert_eq!(summary.tables, 2);
    assert_eq!(summary.wrapped_tables, 1);
    assert!(html.contains(r#"<div class="table-responsive-wrapper" style="overflow-x: auto; margin-bottom: 20px"><table id="wide""#));
    assert!(html.contains(r#"<pre style="position: relative"><code>cargo install folio</code><button class="copy-code-button" type="button">Copy Code</button></pre>"#));

    // rendering the output again is stable
    let (again, _) = enhance_html(&html, &Options::default(), 800.0, false);
    assert_eq!(again, html);
}
