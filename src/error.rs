//! Error types for the webimginfo library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WebImgInfoError`] — **Fatal**: the scan cannot proceed at all
//!   (the page itself could not be fetched, the log file could not be
//!   opened, the configuration is invalid). Returned as
//!   `Err(WebImgInfoError)` from the top-level `scan*` functions.
//!
//! * [`ImageError`] — **Non-fatal**: a single `<img>` element could not be
//!   turned into an artifact. Stored inside [`crate::output::ImageOutcome`]
//!   and the scan moves on to the next element.
//!
//! Metadata-engine failures get their own [`MetadataError`]: they are
//! reported once for the whole batch and never abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the webimginfo library.
///
/// Element-level failures use [`ImageError`] and are stored in
/// [`crate::output::ImageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum WebImgInfoError {
    // ── Page errors ───────────────────────────────────────────────────────
    /// The target string is not an absolute HTTP/HTTPS URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The page could not be downloaded; no image extraction is possible.
    #[error("Failed to fetch page '{url}': {reason}\nCheck your internet connection.")]
    PageFetchFailed { url: String, reason: String },

    /// The page download exceeded the configured timeout.
    #[error("Fetching page '{url}' timed out after {secs}s\nIncrease --page-timeout.")]
    PageTimeout { url: String, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the report log file requested with `--out`.
    #[error("Failed to open log file '{path}': {source}")]
    LogFileFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image element.
///
/// The pipeline logs it and continues with the next element; no artifact is
/// produced for the element that failed.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// None of `data-srcset`, `srcset`, `data-src`, `data-lazy`, `src` is present.
    #[error("No src/srcset/data-src/data-srcset/data-lazy attribute")]
    NoSourceAttribute,

    /// A `data:` reference without a comma separating header and payload.
    #[error("Could not parse data: scheme")]
    MalformedDataScheme { reference: String },

    /// The base64 payload of a `data:` reference is invalid.
    #[error("Could not decode base64: {detail}")]
    DecodeFailure { reference: String, detail: String },

    /// The image GET failed before a response arrived (DNS, connect, timeout).
    #[error("Could not request image URL {url}: {detail}")]
    FetchFailure { url: String, detail: String },

    /// The image GET answered with something other than `200 OK`.
    #[error("Could not extract image with source {url} (HTTP {status})")]
    BadStatus { url: String, status: u16 },

    /// Nothing was left of the reference after filename filtering.
    #[error("Reference '{reference}' normalises to an empty filename")]
    EmptyNormalizedName { reference: String },

    /// The output directory or the artifact file could not be written.
    #[error("Failed to write '{path}': {detail}")]
    DirectoryOrWriteFailure { path: PathBuf, detail: String },
}

/// Failure of the external metadata engine for a whole batch of files.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The engine executable could not be started.
    #[error("Could not run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but produced no usable output.
    #[error("'{program}' failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The engine output was not the expected JSON document.
    #[error("Could not parse metadata output: {0}")]
    Parse(#[from] serde_json::Error),

    /// The blocking engine task panicked or was cancelled.
    #[error("Metadata task failed: {0}")]
    Join(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_source_attribute_display_matches_report_wording() {
        assert_eq!(
            ImageError::NoSourceAttribute.to_string(),
            "No src/srcset/data-src/data-srcset/data-lazy attribute"
        );
    }

    #[test]
    fn bad_status_display() {
        let e = ImageError::BadStatus {
            url: "http://x.test/a.png".into(),
            status: 404,
        };
        let msg = e.to_string();
        assert!(msg.contains("http://x.test/a.png"), "got: {msg}");
        assert!(msg.contains("404"), "got: {msg}");
    }

    #[test]
    fn page_timeout_display() {
        let e = WebImgInfoError::PageTimeout {
            url: "https://example.com".into(),
            secs: 60,
        };
        assert!(e.to_string().contains("60s"));
        assert!(e.to_string().contains("example.com"));
    }

    #[test]
    fn metadata_spawn_display() {
        let e = MetadataError::Spawn {
            program: "exiftool".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(e.to_string().contains("exiftool"));
    }
}
