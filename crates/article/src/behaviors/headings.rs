// ABOUTME: Heading anchor linker: gives every container heading an id and a permalink anchor.
// ABOUTME: Generated ids are sequential per container and never collide with existing ids.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{Document, NodeId, HEADINGS, WITH_ID};
use crate::options::Options;

/// Ensures `heading` has an id, generating `<prefix><index>` when missing.
/// `taken` holds every id in the document and gains the generated one.
fn ensure_id(
    doc: &mut Document,
    heading: NodeId,
    index: usize,
    taken: &mut HashSet<String>,
    opts: &Options,
) -> String {
    if let Some(id) = doc.element_id(heading) {
        return id.to_string();
    }

    let base = format!("{}{}", opts.heading_id_prefix, index);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while taken.contains(&candidate) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    doc.set_attr(heading, "id", candidate.clone());
    taken.insert(candidate.clone());
    candidate
}

fn existing_ids(doc: &Document) -> HashSet<String> {
    doc.select(doc.root(), &WITH_ID)
        .into_iter()
        .filter_map(|node| doc.element_id(node).map(str::to_string))
        .collect()
}

fn has_anchor(doc: &Document, heading: NodeId, opts: &Options) -> bool {
    doc.element_children(heading).into_iter().any(|child| {
        doc.tag_name(child) == Some("a") && doc.has_class(child, &opts.anchor_class)
    })
}

/// Links every heading (h1-h6) under `container`.
///
/// Headings lacking an id receive one, then a permalink anchor is appended.
/// With `guard_duplicate_anchors` set, headings that already carry an anchor
/// are left alone so repeated runs are idempotent. Returns the headings in
/// document order.
pub fn link_headings(doc: &mut Document, container: NodeId, opts: &Options) -> Vec<NodeId> {
    let headings = doc.select(container, &HEADINGS);
    let mut taken = existing_ids(doc);
    let mut appended = 0;

    for (index, heading) in headings.iter().copied().enumerate() {
        let id = ensure_id(doc, heading, index, &mut taken, opts);

        if opts.guard_duplicate_anchors && has_anchor(doc, heading, opts) {
            continue;
        }

        let href = format!("#{}", id);
        let link = doc.create_element(
            "a",
            &[
                ("href", href.as_str()),
                ("class", opts.anchor_class.as_str()),
                ("title", opts.anchor_title.as_str()),
            ],
        );
        doc.set_text(link, opts.anchor_text.clone());
        doc.append_child(heading, link);
        appended += 1;
    }

    debug!(headings = headings.len(), appended, "linked headings");
    headings
}
