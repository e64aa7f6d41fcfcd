// src/scan.rs
//
// Text-node snapshots. The snapshot is taken at call time; later tree
// mutations are the watcher's problem, not the scanner's.

use crate::config::consts::SKIP_TAGS;
use crate::dom::{Document, NodeId};

/// Ordered (document order) text nodes under `root` whose trimmed content is
/// non-empty, excluding anything inside script/style/noscript subtrees.
pub fn text_nodes(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect(doc, root, &mut out);
    out
}

fn collect(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
    if let Some(text) = doc.text(id) {
        if !text.trim().is_empty() {
            out.push(id);
        }
        return;
    }
    if let Some(tag) = doc.tag(id) {
        if SKIP_TAGS.contains(&tag) {
            return;
        }
    }
    for &c in doc.children(id) {
        collect(doc, c, out);
    }
}
