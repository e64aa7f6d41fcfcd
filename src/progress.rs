// src/progress.rs
/// Lightweight progress reporting used by long-running operations (enrich passes).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start of a full pass with the number of text nodes in the snapshot.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one lookup code resolved and its node was rewritten.
    fn item_done(&mut self, _code: &str, _name: &str) {}

    /// Called when a lookup code produced no catalog name.
    fn item_failed(&mut self, _code: &str) {}

    /// Called at the end of a full pass, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
