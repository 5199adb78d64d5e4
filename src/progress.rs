//! Progress-callback trait for per-image scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ScanConfigBuilder::progress_callback`] to receive events
//! as the pipeline works through the page's `<img>` elements.
//!
//! # Example
//!
//! ```rust
//! use webimginfo::{Artifact, ScanConfig, ScanProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl ScanProgressCallback for CountingCallback {
//!     fn on_image_saved(&self, index: usize, total: usize, artifact: &Artifact) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", index + 1, total, artifact.path.display());
//!     }
//! }
//!
//! let config = ScanConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { saved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::Artifact;
use std::sync::Arc;

/// Called by the scan pipeline as it processes each image element.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for one scan are delivered in document order
/// from a single task.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once the page has been parsed.
    ///
    /// # Arguments
    /// * `total_images` — number of `<img>` elements on the page
    fn on_scan_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called before an element's outcome is reported.
    ///
    /// # Arguments
    /// * `index` — 0-indexed element position
    /// * `total` — number of elements on the page
    fn on_image_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when an element's bytes have been written to disk.
    fn on_image_saved(&self, index: usize, total: usize, artifact: &Artifact) {
        let _ = (index, total, artifact);
    }

    /// Called when an element is skipped.
    ///
    /// # Arguments
    /// * `reason` — human-readable description of the failure
    fn on_image_skipped(&self, index: usize, total: usize, reason: &str) {
        let _ = (index, total, reason);
    }

    /// Called once every element has been attempted.
    ///
    /// # Arguments
    /// * `total` — elements on the page
    /// * `saved` — elements that produced an artifact
    fn on_scan_complete(&self, total: usize, saved: usize) {
        let _ = (total, saved);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScanConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        saved: AtomicUsize,
        skipped: AtomicUsize,
        completed_saved: AtomicUsize,
    }

    impl ScanProgressCallback for TrackingCallback {
        fn on_scan_start(&self, total_images: usize) {
            self.started_total.store(total_images, Ordering::SeqCst);
        }

        fn on_image_start(&self, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_saved(&self, _index: usize, _total: usize, _artifact: &Artifact) {
            self.saved.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_skipped(&self, _index: usize, _total: usize, _reason: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_scan_complete(&self, _total: usize, saved: usize) {
            self.completed_saved.store(saved, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_scan_start(2);
        cb.on_image_start(0, 2);
        cb.on_image_skipped(0, 2, "no source");
        cb.on_scan_complete(2, 0);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let artifact = Artifact {
            name: "a.png".into(),
            path: PathBuf::from("out/a.png"),
            size: 3,
        };

        tracker.on_scan_start(2);
        tracker.on_image_start(0, 2);
        tracker.on_image_saved(0, 2, &artifact);
        tracker.on_image_start(1, 2);
        tracker.on_image_skipped(1, 2, "HTTP 404");
        tracker.on_scan_complete(2, 1);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.saved.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed_saved.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_scan_start(1);
        cb.on_image_start(0, 1);
    }
}
