// ABOUTME: Main library entry point for the folio article enhancer.
// ABOUTME: Re-exports the public API: ArticleEnhancer, Document, Options, host traits and errors.

//! Folio article enhancer.
//!
//! Adds heading permalinks, active-section tracking, smooth in-page
//! navigation, code copy buttons and responsive table wrappers to an article
//! container. Browser globals are reached through the traits in [`host`], so
//! the same behaviors run against a live embedding, a static build step or a
//! test harness.
//!
//! # Example
//!
//! ```
//! use folio_article::{ArticleEnhancer, AttrLayout, Document, Environment, SimulatedViewport};
//!
//! let doc = Document::parse_fragment(
//!     r#"<div class="article-content"><h2>Intro</h2><pre><code>cargo run</code></pre></div>"#,
//! );
//! let enhancer = ArticleEnhancer::attach(doc, Environment::new(SimulatedViewport::new(1024.0), AttrLayout));
//! let html = enhancer.into_document().to_html();
//! assert!(html.contains(r##"<a href="#heading-0" class="heading-anchor""##));
//! assert!(html.contains("Copy Code"));
//! ```

pub mod behaviors;
pub mod dom;
pub mod enhancer;
pub mod error;
pub mod host;
pub mod options;

pub use crate::behaviors::{ClickOutcome, CodeBlock, CopyState, TableChanges};
pub use crate::dom::{Document, NodeId};
pub use crate::enhancer::{enhance_html, ArticleEnhancer, EnhanceSummary};
pub use crate::error::{ClipboardError, EnhanceError, ErrorCode};
pub use crate::host::{
    AttrLayout, Clipboard, Clock, Environment, History, Layout, ManualClock, MemoryClipboard,
    MemoryHistory, NoClipboard, ScrollBehavior, SimulatedViewport, SystemClock, TokioClock,
    Viewport,
};
pub use crate::options::{EnhancerBuilder, Options};
