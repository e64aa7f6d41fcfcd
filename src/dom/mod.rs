// src/dom/mod.rs
//
// Owned arena document tree. Stands in for the browser DOM: the enrichment
// pipeline parses page HTML into one of these, mutates it, and serializes it
// back out. Node ids are plain indices; nodes are never freed, a replaced
// node just becomes detached.

mod parse;

pub use parse::parse;

use crate::core::sanitize::{escape_attr, escape_text};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

pub enum NodeData {
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

pub struct Document {
    nodes: Vec<Node>,
    doctype: Option<String>,
    // Some(..) once observe() was called; records nodes attached to the tree
    journal: Option<Vec<NodeId>>,
}

const ROOT: NodeId = NodeId(0);

pub(crate) fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input"
            | "link" | "meta" | "param" | "source" | "track" | "wbr"
    )
}

pub(crate) fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            data: NodeData::Element { tag: s!("#document"), attrs: Vec::new() },
            parent: None,
            children: Vec::new(),
        };
        Self { nodes: vec![root], doctype: None, journal: None }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The scan root: `<body>` when the page has one, else the whole tree.
    pub fn body(&self) -> NodeId {
        self.find_tag(ROOT, "body").unwrap_or(ROOT)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Text(_))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t),
            NodeData::Element { .. } => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Walk up from (excluding) `id` to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { doc: self, cur: self.parent(id) }
    }

    /// A node is attached when its parent chain reaches the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == ROOT {
                return true;
            }
            match self.nodes[cur.0].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /* ---------- construction & mutation ---------- */

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element { tag: s!(tag), attrs: Vec::new() })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(s!(text)))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { data, parent: None, children: Vec::new() });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.record(child);
    }

    /// Swap `new` into `old`'s slot. `old` becomes detached (children intact).
    /// Returns false if `old` has no parent.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(parent) = self.nodes[old.0].parent else { return false };
        let Some(slot) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return false;
        };
        self.nodes[parent.0].children[slot] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        self.record(new);
        true
    }

    /* ---------- attributes & classes ---------- */

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = s!(value),
                None => attrs.push((s!(name), s!(value))),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.retain(|(n, _)| n != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let new = match self.attr(id, "class") {
            Some(cur) if !cur.trim().is_empty() => join!(cur.trim(), " ", class),
            _ => s!(class),
        };
        self.set_attr(id, "class", &new);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(cur) = self.attr(id, "class") else { return };
        let kept: Vec<&str> = cur.split_whitespace().filter(|c| *c != class).collect();
        let joined = kept.join(" ");
        self.set_attr(id, "class", &joined);
    }

    /* ---------- queries ---------- */

    /// First descendant element (document order, excluding `root`) with `tag`.
    pub fn find_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.find_descendant(root, |doc, id| doc.tag(id) == Some(tag))
    }

    /// First descendant element carrying any of `classes`.
    pub fn find_by_class(&self, root: NodeId, classes: &[&str]) -> Option<NodeId> {
        self.find_descendant(root, |doc, id| {
            classes.iter().any(|c| doc.has_class(id, c))
        })
    }

    fn find_descendant(
        &self,
        root: NodeId,
        pred: impl Fn(&Document, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if pred(self, id) {
                return Some(id);
            }
            for &c in self.children(id).iter().rev() {
                stack.push(c);
            }
        }
        None
    }

    /* ---------- mutation journal ---------- */

    /// Start recording attached nodes. The in-process analog of subscribing a
    /// MutationObserver to childList+subtree additions.
    pub fn observe(&mut self) {
        if self.journal.is_none() {
            self.journal = Some(Vec::new());
        }
    }

    pub fn is_observing(&self) -> bool {
        self.journal.is_some()
    }

    /// Take the batch of nodes attached since the last drain.
    pub fn drain_added(&mut self) -> Vec<NodeId> {
        match &mut self.journal {
            Some(j) => std::mem::take(j),
            None => Vec::new(),
        }
    }

    fn record(&mut self, id: NodeId) {
        if self.journal.is_some() && self.is_attached(id) {
            if let Some(j) = &mut self.journal {
                j.push(id);
            }
        }
    }

    /* ---------- serialization ---------- */

    pub fn to_html(&self) -> String {
        let mut out = s!();
        if let Some(dt) = &self.doctype {
            out.push_str("<!doctype ");
            out.push_str(dt);
            out.push_str(">\n");
        }
        for &c in self.children(ROOT) {
            self.write_node(c, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (n, v) in attrs {
                    out.push(' ');
                    out.push_str(n);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                if is_raw_text(tag) {
                    // script/style content is stored verbatim, never escaped
                    for &c in &self.nodes[id.0].children {
                        if let NodeData::Text(t) = &self.nodes[c.0].data {
                            out.push_str(t);
                        }
                    }
                } else {
                    for &c in &self.nodes[id.0].children {
                        self.write_node(c, out);
                    }
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    pub(crate) fn set_doctype(&mut self, dt: &str) {
        self.doctype = Some(s!(dt));
    }

    pub(crate) fn push_raw_attrs(&mut self, id: NodeId, new_attrs: Vec<(String, String)>) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            *attrs = new_attrs;
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    cur: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.doc.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_serialize() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attr(div, "class", "box");
        let t = doc.create_text("a < b & c");
        doc.append_child(div, t);
        let root = doc.root();
        doc.append_child(root, div);
        assert_eq!(doc.to_html(), r#"<div class="box">a &lt; b &amp; c</div>"#);
    }

    #[test]
    fn replace_detaches_old_node() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let old = doc.create_text("old");
        let root = doc.root();
        doc.append_child(root, p);
        doc.append_child(p, old);

        let span = doc.create_element("span");
        assert!(doc.replace_node(old, span));
        assert!(!doc.is_attached(old));
        assert!(doc.is_attached(span));
        assert_eq!(doc.children(p), &[span]);

        // a detached node cannot be replaced again
        assert!(!doc.replace_node(old, span));
    }

    #[test]
    fn class_helpers() {
        let mut doc = Document::new();
        let el = doc.create_element("img");
        doc.set_attr(el, "class", "lazyloaded ls-is-cached");
        assert!(doc.has_class(el, "lazyloaded"));
        doc.remove_class(el, "lazyloaded");
        assert!(!doc.has_class(el, "lazyloaded"));
        assert!(doc.has_class(el, "ls-is-cached"));
        doc.add_class(el, "visible");
        doc.add_class(el, "visible"); // idempotent
        assert_eq!(doc.attr(el, "class"), Some("ls-is-cached visible"));
    }

    #[test]
    fn journal_records_only_attached_nodes() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.observe();

        // building a detached subtree records nothing
        let wrap = doc.create_element("span");
        let t = doc.create_text("x");
        doc.append_child(wrap, t);
        assert!(doc.drain_added().is_empty());

        // attaching the subtree root records exactly that node
        doc.append_child(root, wrap);
        assert_eq!(doc.drain_added(), vec![wrap]);
        assert!(doc.drain_added().is_empty());
    }

    #[test]
    fn find_by_class_skips_root_matches_descendant() {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc.create_element("div");
        doc.set_attr(outer, "class", "product-snippet");
        let inner = doc.create_element("div");
        doc.set_attr(inner, "class", "p-relative");
        doc.append_child(root, outer);
        doc.append_child(outer, inner);

        assert_eq!(doc.find_by_class(outer, &["product-snippet", "p-relative"]), Some(inner));
    }
}
