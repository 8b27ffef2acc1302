// ABOUTME: Deletes near-empty generated asset files matched by a glob pattern.
// ABOUTME: Each file is read and removed in its own tokio task; failures are logged per file.

use std::path::PathBuf;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::CleanError;
use crate::pattern::GlobPattern;

/// Files whose text is at most this many UTF-16 units long are deleted.
pub const MAX_STALE_LEN: usize = 1;

/// Default pattern for minified build output.
pub const DEFAULT_PATTERN: &str = "./assets/*(*.js|*.min.css)";

/// What a clean pass did. Ordering follows task completion and is unspecified.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
    pub failed: Vec<CleanError>,
}

enum FileOutcome {
    Removed(PathBuf),
    Kept(PathBuf),
    Failed(CleanError),
}

/// True when `contents`, decoded as UTF-8, is at most [`MAX_STALE_LEN`]
/// UTF-16 code units long.
pub fn is_stale(contents: &[u8]) -> bool {
    if contents.len() <= MAX_STALE_LEN {
        return true;
    }
    String::from_utf8_lossy(contents)
        .encode_utf16()
        .nth(MAX_STALE_LEN)
        .is_none()
}

async fn clean_one(path: PathBuf) -> FileOutcome {
    let contents = match tokio::fs::read(&path).await {
        Ok(contents) => contents,
        Err(source) => {
            let err = CleanError::Read { path, source };
            error!("{err}");
            return FileOutcome::Failed(err);
        }
    };

    if !is_stale(&contents) {
        debug!(path = %path.display(), bytes = contents.len(), "keeping asset");
        return FileOutcome::Kept(path);
    }

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            info!(path = %path.display(), "removed near-empty asset");
            FileOutcome::Removed(path)
        }
        Err(source) => {
            let err = CleanError::Delete { path, source };
            error!("{err}");
            FileOutcome::Failed(err)
        }
    }
}

/// Cleans every file matched by `pattern`.
///
/// Files are processed concurrently and independently; a failure on one file
/// is logged and does not affect the others. Returns once all files are done.
pub async fn clean(pattern: &GlobPattern) -> CleanReport {
    let mut report = CleanReport::default();

    let walker = pattern.clone();
    let (paths, walk_errors) = match tokio::task::spawn_blocking(move || walker.walk()).await {
        Ok(found) => found,
        Err(err) => {
            error!("asset scan for {} aborted: {err}", pattern.as_str());
            return report;
        }
    };
    for err in walk_errors {
        error!("{err}");
        report.failed.push(err);
    }
    debug!(pattern = pattern.as_str(), files = paths.len(), "matched assets");

    let mut tasks = JoinSet::new();
    for path in paths {
        tasks.spawn(clean_one(path));
    }
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(FileOutcome::Removed(path)) => report.removed.push(path),
            Ok(FileOutcome::Kept(path)) => report.kept.push(path),
            Ok(FileOutcome::Failed(err)) => report.failed.push(err),
            Err(err) => error!("asset clean task failed: {err}"),
        }
    }
    report
}

/// Compiles `pattern` and cleans it. An invalid pattern is logged and
/// cleans nothing.
pub async fn clean_files(pattern: &str) -> CleanReport {
    match GlobPattern::new(pattern) {
        Ok(glob) => clean(&glob).await,
        Err(err) => {
            error!("{err}");
            CleanReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stale() {
        assert!(is_stale(b""));
        assert!(is_stale(b"\n"));
        assert!(is_stale("é".as_bytes()));
        assert!(!is_stale(b"{}"));
        assert!(!is_stale(b"\n\n"));
        // astral characters take two UTF-16 units
        assert!(!is_stale("🦀".as_bytes()));
    }
}
