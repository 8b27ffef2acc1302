// ABOUTME: The five article behaviors, each set up against an explicit document and container.
// ABOUTME: Heading anchors, scroll tracking, smooth scroll, copy buttons and responsive tables.

pub mod copy;
pub mod headings;
pub mod navigation;
pub mod scroll;
pub mod tables;

pub use copy::{CodeBlock, CopyButtons, CopyState};
pub use headings::link_headings;
pub use navigation::{ClickOutcome, SmoothScroll};
pub use scroll::ScrollTracker;
pub use tables::{TableChanges, TableWrapper};
