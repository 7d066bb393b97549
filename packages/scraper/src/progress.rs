//! Progress reporting for scrape runs.
//!
//! The scraper advances a [`ProgressCallback`] once per fetched document.
//! Rendering lives elsewhere (the CLI draws `indicatif` bars); library
//! callers and tests pass [`NullProgress`].

/// Receiver for progress updates. Must be shareable across a whole run.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of documents expected.
    fn set_total(&self, total: u64);

    /// Advances by `delta` documents.
    fn inc(&self, delta: u64);

    /// Updates the status text, usually the address being fetched.
    fn set_message(&self, msg: String);

    /// Marks the run complete.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
