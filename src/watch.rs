// src/watch.rs
//
// Incremental re-enrichment. Mutation batches from the document journal are
// queued as tasks and run to completion one at a time, so enrichments never
// interleave; the only suspension point is inside the lookup call.

use std::collections::VecDeque;

use crate::dom::{Document, NodeId};
use crate::enrich::Enricher;
use crate::progress::Progress;
use crate::scan;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchState {
    /// Created, nothing scanned yet.
    Idle,
    /// Initial pass done, journal subscribed. No terminal state after this.
    Observing,
}

pub struct Watcher {
    state: WatchState,
    queue: VecDeque<Vec<NodeId>>,
}

impl Watcher {
    pub fn new() -> Self {
        Self { state: WatchState::Idle, queue: VecDeque::new() }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// One full enrichment pass, then switch the document's journal on.
    /// Calling again while observing is a no-op. Returns nodes rewritten.
    pub fn start(
        &mut self,
        doc: &mut Document,
        enricher: &mut Enricher,
        progress: Option<&mut dyn Progress>,
    ) -> usize {
        if self.state == WatchState::Observing {
            return 0;
        }
        let enriched = enricher.enrich_all(doc, progress);
        doc.observe();
        self.state = WatchState::Observing;
        enriched
    }

    /// Drain pending mutation batches and enrich every candidate text node
    /// they introduced. Nodes the enricher inserts during this call are
    /// journaled like any other addition and converge to no-ops via the
    /// processed guard. Returns nodes rewritten.
    pub fn poll(
        &mut self,
        doc: &mut Document,
        enricher: &mut Enricher,
        mut progress: Option<&mut (dyn Progress + '_)>,
    ) -> usize {
        if self.state != WatchState::Observing {
            return 0;
        }

        self.enqueue_batch(doc.drain_added());

        let mut enriched = 0;
        while let Some(batch) = self.queue.pop_front() {
            for added in batch {
                for id in added_text_nodes(doc, added) {
                    if enricher.enrich_node(doc, id, progress.as_deref_mut()) {
                        enriched += 1;
                    }
                }
            }
            // additions made while running this task become the next task
            self.enqueue_batch(doc.drain_added());
        }
        enriched
    }

    fn enqueue_batch(&mut self, batch: Vec<NodeId>) {
        if !batch.is_empty() {
            self.queue.push_back(batch);
        }
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

/// An added node is either a text node itself or a subtree to scan.
fn added_text_nodes(doc: &Document, id: NodeId) -> Vec<NodeId> {
    if doc.is_text(id) {
        let non_empty = doc.text(id).is_some_and(|t| !t.trim().is_empty());
        if non_empty { vec![id] } else { Vec::new() }
    } else {
        scan::text_nodes(doc, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NameSource;
    use crate::dom;
    use std::collections::HashMap;

    struct StubNames(HashMap<String, String>);

    impl StubNames {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self(pairs.iter().map(|(k, v)| (s!(*k), s!(*v))).collect())
        }
    }

    impl NameSource for StubNames {
        fn set_name(&self, code: &str) -> Option<String> {
            self.0.get(code).cloned()
        }
    }

    #[test]
    fn poll_before_start_does_nothing() {
        let mut doc = dom::parse("<body><p>M4321</p></body>");
        let names = StubNames::with(&[("1234", "Fire Temple")]);
        let mut enricher = Enricher::new(&names);
        let mut watcher = Watcher::new();

        assert_eq!(watcher.state(), WatchState::Idle);
        assert_eq!(watcher.poll(&mut doc, &mut enricher, None), 0);
        assert!(!doc.to_html().contains("Fire Temple"));
    }

    #[test]
    fn start_runs_the_initial_pass_once() {
        let mut doc = dom::parse("<body><p>M4321</p></body>");
        let names = StubNames::with(&[("1234", "Fire Temple")]);
        let mut enricher = Enricher::new(&names);
        let mut watcher = Watcher::new();

        assert_eq!(watcher.start(&mut doc, &mut enricher, None), 1);
        assert_eq!(watcher.state(), WatchState::Observing);
        // idempotent while observing
        assert_eq!(watcher.start(&mut doc, &mut enricher, None), 0);
        assert_eq!(doc.to_html().matches("(Fire Temple)").count(), 1);
    }

    #[test]
    fn added_subtree_is_enriched_incrementally() {
        let mut doc = dom::parse("<body><div id=\"list\"><p>M4321</p></div></body>");
        let names = StubNames::with(&[("1234", "Fire Temple"), ("55555", "Saturn V")]);
        let mut enricher = Enricher::new(&names);
        let mut watcher = Watcher::new();
        watcher.start(&mut doc, &mut enricher, None);

        // dynamic content lands after the initial pass
        let list = doc.find_tag(doc.root(), "div").unwrap();
        let p = doc.create_element("p");
        let t = doc.create_text("New N55555 listing");
        doc.append_child(p, t);
        doc.append_child(list, p);

        assert_eq!(watcher.poll(&mut doc, &mut enricher, None), 1);
        let html = doc.to_html();
        assert!(html.contains("(Saturn V)"));
        // and the wrapper inserted by that enrichment was not itself re-enriched
        assert_eq!(html.matches("(Saturn V)").count(), 1);
        assert_eq!(html.matches("(Fire Temple)").count(), 1);

        // nothing left in the pipe
        assert_eq!(watcher.poll(&mut doc, &mut enricher, None), 0);
    }

    #[test]
    fn added_bare_text_node_is_enriched() {
        let mut doc = dom::parse("<body><p id=\"slot\">waiting</p></body>");
        let names = StubNames::with(&[("1234", "Fire Temple")]);
        let mut enricher = Enricher::new(&names);
        let mut watcher = Watcher::new();
        watcher.start(&mut doc, &mut enricher, None);

        let slot = doc.find_tag(doc.root(), "p").unwrap();
        let t = doc.create_text(" M4321 ");
        doc.append_child(slot, t);

        assert_eq!(watcher.poll(&mut doc, &mut enricher, None), 1);
        assert!(doc.to_html().contains("(Fire Temple)"));
    }
}
