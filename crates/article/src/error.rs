// ABOUTME: Error types for the article enhancer including ErrorCode enum and EnhanceError struct.
// ABOUTME: Also defines ClipboardError, the failure type of host clipboard writes.

use std::fmt;

/// Error codes representing different categories of enhancer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "not found",
            ErrorCode::Config => "invalid configuration",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for enhancer operations.
#[derive(Debug, thiserror::Error)]
pub struct EnhanceError {
    pub code: ErrorCode,
    pub op: String,
    pub target: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folio: {}", self.op)?;
        if !self.target.is_empty() {
            write!(f, " {}", self.target)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl EnhanceError {
    /// Create a NotFound error.
    pub fn not_found(target: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            op: op.into(),
            target: target.into(),
            source: None,
        }
    }

    /// Create a Config error.
    pub fn config(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Config,
            op: op.into(),
            target: target.into(),
            source,
        }
    }

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }
}

/// Failure reported by a [`crate::host::Clipboard`] write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// The host refused the write (permissions, focus, ...).
    #[error("clipboard write rejected: {0}")]
    Rejected(String),

    /// No clipboard is available in this environment.
    #[error("clipboard unavailable")]
    Unavailable,
}
