// ABOUTME: Error types for asset cleaning operations.
// ABOUTME: Provides CleanError with Pattern, Walk, Read and Delete variants.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while matching or cleaning asset files.
#[derive(Debug, Error)]
pub enum CleanError {
    /// The glob pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },

    /// A directory under the pattern base could not be listed.
    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    /// A matched file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A near-empty file could not be deleted.
    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CleanError {
    /// Creates a Pattern error.
    pub fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        CleanError::Pattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Path of the file the error is about, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            CleanError::Pattern { .. } => None,
            CleanError::Walk { path, .. }
            | CleanError::Read { path, .. }
            | CleanError::Delete { path, .. } => Some(path),
        }
    }
}
