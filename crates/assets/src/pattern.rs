// ABOUTME: Glob pattern compilation and directory walking for asset matching.
// ABOUTME: Translates glob syntax (including extglob groups) to an anchored regex over relative paths.

//! Glob patterns.
//!
//! A pattern is split into a literal base directory and the wildcard part.
//! The wildcard part is compiled into one regex matched against paths relative
//! to the base, using `/` as separator.
//!
//! Supported syntax:
//! - `*`, `?`, `[abc]`, `[!a-z]` within one path segment
//! - `{a,b}` alternatives
//! - `**` as a whole segment for any number of directories
//! - extglob groups `*(a|b)`, `+(a|b)`, `?(a|b)`, `@(a|b)`
//!
//! Negated extglobs `!(..)` are rejected. Hidden files only match when the
//! pattern segment itself starts with a dot.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::CleanError;

const WILDCARD_CHARS: &[char] = &['*', '?', '[', '{', '('];

fn has_wildcard(segment: &str) -> bool {
    segment.contains(WILDCARD_CHARS)
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    base: PathBuf,
    matcher: Regex,
    max_depth: Option<usize>,
    match_hidden: bool,
}

impl GlobPattern {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, CleanError> {
        let absolute = pattern.starts_with('/');
        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(CleanError::pattern(pattern, "pattern names no files"));
        }

        let mut split = segments
            .iter()
            .position(|s| has_wildcard(s))
            .unwrap_or(segments.len());
        if split == segments.len() {
            // fully literal: match the final path segment under its parent
            split -= 1;
        }
        let (literal, rest) = segments.split_at(split);

        let mut base = if absolute {
            PathBuf::from("/")
        } else if literal.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::new()
        };
        for segment in literal {
            base.push(segment);
        }

        let last = rest.len() - 1;
        let mut re = String::from("^");
        for (i, segment) in rest.iter().enumerate() {
            if *segment == "**" {
                re.push_str(if i == last { ".*" } else { "(?:[^/]+/)*" });
                continue;
            }
            re.push_str(&translate_segment(segment, pattern)?);
            if i != last {
                re.push('/');
            }
        }
        re.push('$');

        let matcher =
            Regex::new(&re).map_err(|e| CleanError::pattern(pattern, e.to_string()))?;
        let max_depth = if rest.contains(&"**") {
            None
        } else {
            Some(rest.len())
        };
        let match_hidden = rest.iter().any(|s| s.starts_with('.'));

        debug!(pattern, base = %base.display(), regex = %re, "compiled glob");
        Ok(Self {
            raw: pattern.to_string(),
            base,
            matcher,
            max_depth,
            match_hidden,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Directory the walk starts from.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Tests a `/`-separated path relative to [`GlobPattern::base`].
    pub fn matches_relative(&self, relative: &str) -> bool {
        if !self.match_hidden && relative.split('/').any(|s| s.starts_with('.')) {
            return false;
        }
        self.matcher.is_match(relative)
    }

    /// Lists matching files under the base directory in file-name order.
    /// Unreadable directories are reported and skipped.
    pub fn walk(&self) -> (Vec<PathBuf>, Vec<CleanError>) {
        let mut matches = Vec::new();
        let mut errors = Vec::new();

        if !self.base.is_dir() {
            debug!(base = %self.base.display(), "glob base is not a directory");
            return (matches, errors);
        }

        let mut walker = WalkDir::new(&self.base).min_depth(1).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let match_hidden = self.match_hidden;
        for entry in walker
            .into_iter()
            .filter_entry(|e| match_hidden || !is_hidden(e))
        {
            match entry {
                Ok(entry) => {
                    if !entry.path().is_file() {
                        continue;
                    }
                    let Ok(relative) = entry.path().strip_prefix(&self.base) else {
                        continue;
                    };
                    let relative = relative.to_string_lossy().replace('\\', "/");
                    if self.matcher.is_match(&relative) {
                        matches.push(entry.into_path());
                    }
                }
                Err(err) => errors.push(CleanError::Walk {
                    path: err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.base.clone()),
                    reason: err.to_string(),
                }),
            }
        }

        (matches, errors)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn translate_segment(segment: &str, pattern: &str) -> Result<String, CleanError> {
    let chars: Vec<char> = segment.chars().collect();
    let mut pos = 0;
    let out = translate_seq(&chars, &mut pos, &[], pattern)?;
    Ok(out)
}

/// Translates until one of `stops` is reached at this nesting level. The stop
/// character is left unconsumed.
fn translate_seq(
    chars: &[char],
    pos: &mut usize,
    stops: &[char],
    pattern: &str,
) -> Result<String, CleanError> {
    let mut out = String::new();
    while let Some(&c) = chars.get(*pos) {
        if stops.contains(&c) {
            break;
        }
        let opens_group = chars.get(*pos + 1) == Some(&'(');
        match c {
            '!' if opens_group => {
                return Err(CleanError::pattern(pattern, "negated groups !(..) are not supported"));
            }
            '*' | '?' | '+' | '@' if opens_group => {
                *pos += 2;
                let alts = translate_alternatives(chars, pos, '|', ')', pattern)?;
                let quantifier = match c {
                    '*' => "*",
                    '+' => "+",
                    '?' => "?",
                    _ => "",
                };
                out.push_str(&format!("(?:{}){}", alts.join("|"), quantifier));
            }
            '*' => {
                out.push_str("[^/]*");
                *pos += 1;
            }
            '?' => {
                out.push_str("[^/]");
                *pos += 1;
            }
            '{' => {
                *pos += 1;
                let alts = translate_alternatives(chars, pos, ',', '}', pattern)?;
                out.push_str(&format!("(?:{})", alts.join("|")));
            }
            '[' => match translate_class(chars, *pos) {
                Some((class, next)) => {
                    out.push_str(&class);
                    *pos = next;
                }
                None => {
                    out.push_str(r"\[");
                    *pos += 1;
                }
            },
            '\\' => {
                *pos += 1;
                match chars.get(*pos) {
                    Some(&escaped) => {
                        out.push_str(&regex::escape(&escaped.to_string()));
                        *pos += 1;
                    }
                    None => out.push_str(r"\\"),
                }
            }
            _ => {
                out.push_str(&regex::escape(&c.to_string()));
                *pos += 1;
            }
        }
    }
    Ok(out)
}

/// Reads `alt(sep alt)* close`, consuming the closing character.
fn translate_alternatives(
    chars: &[char],
    pos: &mut usize,
    sep: char,
    close: char,
    pattern: &str,
) -> Result<Vec<String>, CleanError> {
    let mut alts = Vec::new();
    loop {
        alts.push(translate_seq(chars, pos, &[sep, close], pattern)?);
        match chars.get(*pos) {
            Some(&c) if c == sep => *pos += 1,
            Some(&c) if c == close => {
                *pos += 1;
                return Ok(alts);
            }
            _ => {
                return Err(CleanError::pattern(
                    pattern,
                    format!("unclosed group, expected '{}'", close),
                ))
            }
        }
    }
}

/// Translates a `[...]` class starting at `start`. Returns the regex class and
/// the position after `]`, or `None` when the bracket is never closed.
fn translate_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 1;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }
    let body_start = i;
    // a leading ']' is a literal member
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while chars.get(i)? != &']' {
        i += 1;
    }

    let mut class = String::from(if negated { "[^/" } else { "[" });
    for &c in &chars[body_start..i] {
        if matches!(c, '\\' | '[' | ']' | '&' | '~' | '^') {
            class.push('\\');
        }
        class.push(c);
    }
    class.push(']');
    Some((class, i + 1))
}
