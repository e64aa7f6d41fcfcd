// src/enrich.rs
//
// The rewrite step and the state that guards it. One Enricher per page
// session: it owns the processed-node set, so nothing here is global and
// teardown is just dropping the value.

use std::collections::HashSet;

use crate::catalog::{self, NameSource};
use crate::config::consts::{
    ENRICHED_CLASS, IMAGE_WRAPPER_CLASSES, IMG_ONERROR_JS, IMG_ONLOAD_JS,
    IMG_VISIBLE_STYLE, LAZY_ATTRS, LAZY_CLASSES, LINK_STYLE,
    PRODUCT_CONTAINER_CLASSES, WRAPPER_STYLE,
};
use crate::dom::{Document, NodeId};
use crate::matcher;
use crate::progress::Progress;
use crate::scan;

pub struct Enricher<'a> {
    names: &'a dyn NameSource,
    processed: HashSet<NodeId>,
}

impl<'a> Enricher<'a> {
    pub fn new(names: &'a dyn NameSource) -> Self {
        Self { names, processed: HashSet::new() }
    }

    /// Full pass: snapshot the body's text nodes and run each through
    /// match → lookup → rewrite. Returns the number of nodes rewritten.
    pub fn enrich_all(
        &mut self,
        doc: &mut Document,
        mut progress: Option<&mut (dyn Progress + '_)>,
    ) -> usize {
        let nodes = scan::text_nodes(doc, doc.body());
        logf!("full pass: {} text nodes", nodes.len());
        if let Some(p) = progress.as_deref_mut() {
            p.begin(nodes.len());
        }

        let mut enriched = 0;
        for id in nodes {
            if self.enrich_node(doc, id, progress.as_deref_mut()) {
                enriched += 1;
            }
        }

        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        enriched
    }

    /// One enrichment attempt. True only when the node was rewritten.
    pub fn enrich_node(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        mut progress: Option<&mut (dyn Progress + '_)>,
    ) -> bool {
        if self.processed.contains(&id) || !doc.is_attached(id) {
            return false;
        }
        if self.has_enriched_ancestor(doc, id) {
            // our own wrapper output, or a node someone already handled
            self.processed.insert(id);
            return false;
        }

        let Some(text) = doc.text(id) else { return false };
        let text = s!(text.trim());
        if text.is_empty() {
            return false;
        }

        let Some(digits) = matcher::find_code(&text) else { return false };
        let lookup = matcher::reverse_digits(&digits);

        // A match means a lookup attempt; one attempt per node, pass or fail.
        self.processed.insert(id);

        let Some(name) = self.names.set_name(&lookup) else {
            logd!("no catalog name for {digits} (lookup {lookup})");
            if let Some(p) = progress.as_deref_mut() {
                p.item_failed(&lookup);
            }
            return false;
        };

        if self.repoint_product_image(doc, id, &lookup, &name).is_none() {
            logd!("no product image container near code {digits}");
        }

        self.rewrite_node(doc, id, &text, &lookup, &name);
        logf!("enriched {digits} -> {lookup} \"{name}\"");
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(&lookup, &name);
        }
        true
    }

    fn has_enriched_ancestor(&self, doc: &Document, id: NodeId) -> bool {
        doc.ancestors(id).any(|a| doc.has_class(a, ENRICHED_CLASS))
    }

    /// Replace the matched text node with `<span class=…>original text<a>(Name)</a></span>`.
    fn rewrite_node(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        original: &str,
        lookup: &str,
        name: &str,
    ) {
        let wrapper = doc.create_element("span");
        doc.set_attr(wrapper, "class", ENRICHED_CLASS);
        doc.set_attr(wrapper, "style", WRAPPER_STYLE);

        let kept = doc.create_text(original);
        doc.append_child(wrapper, kept);

        let link = doc.create_element("a");
        doc.set_attr(link, "href", &catalog::catalog_url(lookup));
        doc.set_attr(link, "target", "_blank");
        doc.set_attr(link, "style", LINK_STYLE);
        let label = doc.create_text(&format!("({name})"));
        doc.append_child(link, label);
        doc.append_child(wrapper, link);

        doc.replace_node(id, wrapper);

        // generated nodes never need another look
        self.processed.extend([wrapper, kept, link, label]);
    }

    /// Best effort: find the surrounding product snippet and point its image
    /// at the catalog render. Every missing piece is a silent skip.
    fn repoint_product_image(
        &self,
        doc: &mut Document,
        origin: NodeId,
        lookup: &str,
        name: &str,
    ) -> Option<()> {
        let container = doc.ancestors(origin).find(|&a| {
            PRODUCT_CONTAINER_CLASSES.iter().any(|c| doc.has_class(a, c))
        })?;
        let wrapper = doc.find_by_class(container, &IMAGE_WRAPPER_CLASSES)?;
        let img = doc.find_tag(wrapper, "img")?;

        for attr in LAZY_ATTRS {
            doc.remove_attr(img, attr);
        }
        for class in LAZY_CLASSES {
            doc.remove_class(img, class);
        }

        doc.set_attr(img, "src", &catalog::image_url(lookup));
        doc.set_attr(img, "alt", name);
        doc.set_attr(img, "style", IMG_VISIBLE_STYLE);
        doc.set_attr(img, "onload", IMG_ONLOAD_JS);
        doc.set_attr(img, "onerror", IMG_ONERROR_JS);
        Some(())
    }
}
