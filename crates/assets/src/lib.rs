// ABOUTME: Build-time housekeeping for generated assets.
// ABOUTME: Provides glob pattern matching and deletion of near-empty asset files.

pub mod cleaner;
pub mod error;
pub mod pattern;

pub use cleaner::{clean, clean_files, is_stale, CleanReport, DEFAULT_PATTERN, MAX_STALE_LEN};
pub use error::CleanError;
pub use pattern::GlobPattern;
