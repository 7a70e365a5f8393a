//! Progress-callback trait for per-document extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] into
//! [`crate::assistant::Assistant::ingest`] to be told when each uploaded
//! document starts and finishes. Events are per document, never per page:
//! a 300-page PDF is one tick.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfqa::ExtractionProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} done ({} chars)", index + 1, total, chars);
//!     }
//! }
//! ```

use std::sync::Arc;
use tracing::{debug, info};

/// Called by the extraction stage as it works through a batch.
///
/// Extraction runs on tokio's blocking pool, so implementations must be
/// `Send + Sync`. Every method has a no-op default.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before the first document is opened.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before a document is opened.
    ///
    /// # Arguments
    /// * `index`: 0-indexed position of the document in the batch
    /// * `total`: number of documents in the batch
    /// * `filename`: name the document was uploaded under
    fn on_document_start(&self, index: usize, total: usize, filename: &str) {
        let _ = (index, total, filename);
    }

    /// Called after all pages of a document were read.
    ///
    /// `chars` is the number of characters the document contributed to the
    /// combined text.
    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        let _ = (index, total, chars);
    }

    /// Called once after the last document. Not called when the batch aborts.
    fn on_batch_complete(&self, total_documents: usize, total_chars: usize) {
        let _ = (total_documents, total_chars);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Forwards progress events to `tracing`. Used by the web server, where
/// there is no terminal to draw a bar on.
pub struct TracingProgressCallback;

impl ExtractionProgressCallback for TracingProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        debug!("Processing {} PDF document(s)", total_documents);
    }

    fn on_document_start(&self, index: usize, total: usize, filename: &str) {
        info!("Processing {} ({}/{})", filename, index + 1, total);
    }

    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        debug!("Document {}/{} yielded {} chars", index + 1, total, chars);
    }

    fn on_batch_complete(&self, total_documents: usize, total_chars: usize) {
        info!(
            "Processing complete: {} document(s), {} chars",
            total_documents, total_chars
        );
    }
}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        batch_total: AtomicUsize,
        chars: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_documents: usize) {
            self.batch_total.store(total_documents, Ordering::SeqCst);
        }

        fn on_document_start(&self, _index: usize, _total: usize, _filename: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _index: usize, _total: usize, chars: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.chars.fetch_add(chars, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_document_start(0, 2, "a.pdf");
        cb.on_document_complete(0, 2, 10);
        cb.on_batch_complete(2, 10);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(2);
        tracker.on_document_start(0, 2, "a.pdf");
        tracker.on_document_complete(0, 2, 5);
        tracker.on_document_start(1, 2, "b.pdf");
        tracker.on_document_complete(1, 2, 7);

        assert_eq!(tracker.batch_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.chars.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(TracingProgressCallback);
        cb.on_batch_start(1);
        cb.on_document_start(0, 1, "only.pdf");
        cb.on_document_complete(0, 1, 0);
        cb.on_batch_complete(1, 0);
    }
}
