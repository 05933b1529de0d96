//! Progress-callback trait for per-page processing events.
//!
//! Inject an [`Arc<dyn ProcessingProgressCallback>`] via
//! [`crate::config::ProcessingConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through a document. Callers can forward them
//! to a terminal progress bar, a job record, or a log line without the
//! library knowing how the host application communicates.
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{ProcessingConfig, ProcessingProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ProcessingProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, artifacts: usize) {
//!         self.written.fetch_add(artifacts, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ProcessingConfig::builder()
//!     .progress_callback(counter as Arc<dyn ProcessingProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
///
/// Pages are processed strictly in order on one thread, so events for one
/// document never interleave. The trait is still `Send + Sync` because the
/// config (and its callback) may be moved onto tokio's blocking pool or shared
/// by several jobs. All methods default to no-ops.
pub trait ProcessingProgressCallback: Send + Sync {
    /// Called once after the document is opened, before page 1.
    fn on_process_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is rendered.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after every artifact of a page has been written.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages
    /// * `artifacts`: files written for this page (1, or 2 when splitting)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, artifacts: usize) {
        let _ = (page_num, total_pages, artifacts);
    }

    /// Called when a page fails. No further pages are processed after this.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once when the loop ends, successfully or not.
    ///
    /// # Arguments
    /// * `total_pages`: total pages in the document
    /// * `completed_pages`: pages whose artifacts were all written
    fn on_process_complete(&self, total_pages: usize, completed_pages: usize) {
        let _ = (total_pages, completed_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProcessingProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn ProcessingProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        artifacts: AtomicUsize,
        errors: AtomicUsize,
        completed_total: AtomicUsize,
    }

    impl ProcessingProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page_num: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, artifacts: usize) {
            self.artifacts.fetch_add(artifacts, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _total_pages: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_process_complete(&self, _total_pages: usize, completed_pages: usize) {
            self.completed_total.store(completed_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_process_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 2);
        cb.on_page_error(2, 5, "crop margin too large");
        cb.on_process_complete(5, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_page_start(1, 2);
        tracker.on_page_complete(1, 2, 2);
        tracker.on_page_start(2, 2);
        tracker.on_page_error(2, 2, "disk full");
        tracker.on_process_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.artifacts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_process_start(10);
        cb.on_page_complete(1, 10, 1);
    }
}
