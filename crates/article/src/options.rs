// ABOUTME: Configuration options for the article enhancer and the EnhancerBuilder fluent API.
// ABOUTME: Options deserialize from TOML with every field defaulted.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::dom::{Document, NodeId};
use crate::enhancer::ArticleEnhancer;
use crate::error::EnhanceError;
use crate::host::Environment;

/// Class names, labels and thresholds used by the enhancer behaviors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Class marking the article body all behaviors are scoped to.
    pub container_class: String,
    /// Prefix of generated heading ids; the heading index is appended.
    pub heading_id_prefix: String,
    pub anchor_class: String,
    pub anchor_text: String,
    pub anchor_title: String,
    /// Skip headings that already carry an anchor when linking.
    pub guard_duplicate_anchors: bool,
    pub active_class: String,
    /// A heading becomes current once it is within this many pixels below
    /// the scroll position.
    pub scroll_offset: f64,
    /// Tables wider than the viewport minus this margin get wrapped.
    pub table_margin: f64,
    pub wrapper_class: String,
    pub wrapper_style: String,
    pub copy_button_class: String,
    pub copied_class: String,
    pub copy_label: String,
    pub copied_label: String,
    pub copy_failed_label: String,
    /// How long the "copied" feedback stays before reverting.
    pub copy_reset_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            container_class: "article-content".to_string(),
            heading_id_prefix: "heading-".to_string(),
            anchor_class: "heading-anchor".to_string(),
            anchor_text: "#".to_string(),
            anchor_title: "Permalink to heading".to_string(),
            guard_duplicate_anchors: true,
            active_class: "active".to_string(),
            scroll_offset: 200.0,
            table_margin: 40.0,
            wrapper_class: "table-responsive-wrapper".to_string(),
            wrapper_style: "overflow-x: auto; margin-bottom: 20px".to_string(),
            copy_button_class: "copy-code-button".to_string(),
            copied_class: "copied".to_string(),
            copy_label: "Copy Code".to_string(),
            copied_label: "Copied!".to_string(),
            copy_failed_label: "Copy Failed".to_string(),
            copy_reset_ms: 2000,
        }
    }
}

impl Options {
    pub fn copy_reset(&self) -> Duration {
        Duration::from_millis(self.copy_reset_ms)
    }

    /// Parses options from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, EnhanceError> {
        toml::from_str(s).map_err(|e| {
            EnhanceError::config("<string>", "parse options", Some(anyhow::Error::new(e)))
        })
    }

    /// Loads options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, EnhanceError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EnhanceError::config(
                path.display().to_string(),
                "read options",
                Some(anyhow::Error::new(e)),
            )
        })?;
        toml::from_str(&text).map_err(|e| {
            EnhanceError::config(
                path.display().to_string(),
                "parse options",
                Some(anyhow::Error::new(e)),
            )
        })
    }
}

/// Builder for constructing ArticleEnhancer instances with custom options.
#[derive(Debug, Clone, Default)]
pub struct EnhancerBuilder {
    opts: Options,
}

impl EnhancerBuilder {
    /// Create a new EnhancerBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    /// Set the class marking the content container.
    pub fn container_class(mut self, class: impl Into<String>) -> Self {
        self.opts.container_class = class.into();
        self
    }

    /// Set the prefix of generated heading ids.
    pub fn heading_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.opts.heading_id_prefix = prefix.into();
        self
    }

    /// Enable or disable the duplicate-anchor guard.
    pub fn guard_duplicate_anchors(mut self, guard: bool) -> Self {
        self.opts.guard_duplicate_anchors = guard;
        self
    }

    /// Set the scroll offset used to pick the current heading.
    pub fn scroll_offset(mut self, px: f64) -> Self {
        self.opts.scroll_offset = px;
        self
    }

    /// Set the horizontal margin used by the table wrapper.
    pub fn table_margin(mut self, px: f64) -> Self {
        self.opts.table_margin = px;
        self
    }

    /// Set how long copy feedback stays visible.
    pub fn copy_reset(mut self, after: Duration) -> Self {
        self.opts.copy_reset_ms = after.as_millis() as u64;
        self
    }

    /// Attach to the first container found in `doc`.
    pub fn attach(self, doc: Document, env: Environment) -> ArticleEnhancer {
        ArticleEnhancer::attach_with(doc, env, self.opts)
    }

    /// Attach to an explicit container element.
    pub fn attach_to(self, doc: Document, container: NodeId, env: Environment) -> ArticleEnhancer {
        ArticleEnhancer::attach_to(doc, Some(container), env, self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let opts = Options::from_toml_str(
            r#"
container_class = "post-body"
copy_reset_ms = 500
"#,
        )
        .unwrap();
        assert_eq!(opts.container_class, "post-body");
        assert_eq!(opts.copy_reset(), Duration::from_millis(500));
        assert_eq!(opts.scroll_offset, 200.0);
        assert_eq!(opts.copy_label, "Copy Code");
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = Options::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Options::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("read options"));
    }
}
