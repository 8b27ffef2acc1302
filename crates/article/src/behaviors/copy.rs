// ABOUTME: Copy-to-clipboard buttons for preformatted code blocks.
// ABOUTME: Tracks per-button feedback state and the uncancellable revert timers.

use std::time::Instant;

use tracing::{debug, error};

use crate::dom::{Document, NodeId, CODE, CODE_BLOCKS};
use crate::error::ClipboardError;
use crate::options::Options;

/// Feedback state of a copy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Copied,
    Failed,
}

/// A code block and the button injected into it.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    pub block: NodeId,
    pub button: NodeId,
    pub state: CopyState,
}

#[derive(Debug, Clone, Copy)]
struct RevertTimer {
    block: usize,
    due: Instant,
}

/// Copy buttons of one container plus their pending revert timers.
#[derive(Debug, Clone, Default)]
pub struct CopyButtons {
    blocks: Vec<CodeBlock>,
    timers: Vec<RevertTimer>,
}

fn existing_button(doc: &Document, block: NodeId, opts: &Options) -> Option<NodeId> {
    doc.element_children(block).into_iter().find(|child| {
        doc.tag_name(*child) == Some("button") && doc.has_class(*child, &opts.copy_button_class)
    })
}

/// Rewrites an inline style so that its `position` is `relative`, keeping
/// every other declaration in order.
fn with_relative_position(style: &str) -> String {
    let mut declarations: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or("").trim();
            !property.eq_ignore_ascii_case("position")
        })
        .collect();
    declarations.push("position: relative");
    declarations.join("; ")
}

fn make_relative(doc: &mut Document, block: NodeId) {
    let style = with_relative_position(doc.attr(block, "style").unwrap_or(""));
    doc.set_attr(block, "style", style);
}

impl CopyButtons {
    /// Injects a copy button into every `pre` under `container`.
    /// Blocks that already have one keep it.
    pub fn attach(doc: &mut Document, container: NodeId, opts: &Options) -> Self {
        let mut blocks = Vec::new();
        for block in doc.select(container, &CODE_BLOCKS) {
            let button = match existing_button(doc, block, opts) {
                Some(button) => button,
                None => {
                    let button = doc.create_element(
                        "button",
                        &[("class", opts.copy_button_class.as_str()), ("type", "button")],
                    );
                    doc.set_text(button, opts.copy_label.clone());
                    make_relative(doc, block);
                    doc.append_child(block, button);
                    button
                }
            };
            blocks.push(CodeBlock {
                block,
                button,
                state: CopyState::Idle,
            });
        }
        debug!(blocks = blocks.len(), "attached copy buttons");
        Self {
            blocks,
            timers: Vec::new(),
        }
    }

    pub fn blocks(&self) -> &[CodeBlock] {
        &self.blocks
    }

    /// Index of the block owning `node` (the `pre` or its button).
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.block == node || b.button == node)
    }

    pub fn state(&self, index: usize) -> Option<CopyState> {
        self.blocks.get(index).map(|b| b.state)
    }

    /// Text to put on the clipboard: the first `code` descendant, or the
    /// block itself minus the injected button.
    pub fn code_text(&self, doc: &Document, index: usize) -> Option<String> {
        let entry = self.blocks.get(index)?;
        let text = match doc.select(entry.block, &CODE).first() {
            Some(code) => doc.text_content(*code),
            None => doc.text_content_excluding(entry.block, &[entry.button]),
        };
        Some(text)
    }

    /// Applies the result of a clipboard write to block `index`.
    ///
    /// Success shows the copied label and schedules a revert at
    /// `now + copy_reset`. Failure shows the failure label and stays.
    pub fn finish(
        &mut self,
        doc: &mut Document,
        index: usize,
        result: Result<(), ClipboardError>,
        now: Instant,
        opts: &Options,
    ) -> Option<CopyState> {
        let entry = self.blocks.get_mut(index)?;
        match result {
            Ok(()) => {
                doc.set_text(entry.button, opts.copied_label.clone());
                doc.add_class(entry.button, &opts.copied_class);
                entry.state = CopyState::Copied;
                self.timers.push(RevertTimer {
                    block: index,
                    due: now + opts.copy_reset(),
                });
            }
            Err(err) => {
                error!("Failed to copy code: {err}");
                doc.set_text(entry.button, opts.copy_failed_label.clone());
                entry.state = CopyState::Failed;
            }
        }
        Some(entry.state)
    }

    /// Fires every timer due at `now`. Returns how many fired.
    pub fn run_due(&mut self, doc: &mut Document, now: Instant, opts: &Options) -> usize {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.iter().copied().partition(|t| t.due <= now);
        self.timers = pending;

        for timer in &due {
            if let Some(entry) = self.blocks.get_mut(timer.block) {
                doc.set_text(entry.button, opts.copy_label.clone());
                doc.remove_class(entry.button, &opts.copied_class);
                entry.state = CopyState::Idle;
            }
        }
        due.len()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
