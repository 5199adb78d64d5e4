//! Result types produced by a scan.
//!
//! Everything here is plain data and `serde`-serialisable so the CLI can
//! emit a whole run as JSON with `--json`.

use crate::error::ImageError;
use crate::metadata::FileMetadata;
use crate::pipeline::extract::SourceAttribute;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Immutable per-run state: the page URL (base for relative references) and
/// the directory artifacts are written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    /// The scanned page, as parsed from the user input.
    pub url: Url,
    /// Directory receiving the extracted images.
    pub output_dir: PathBuf,
}

impl PageContext {
    pub fn new(url: Url, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url,
            output_dir: output_dir.into(),
        }
    }

    /// Length of the output directory path in characters, as used by the
    /// filename length bound.
    pub fn output_dir_len(&self) -> usize {
        self.output_dir.to_string_lossy().chars().count()
    }
}

/// A locally persisted copy of one acquired image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Normalised file name inside the output directory.
    pub name: String,
    /// Full path the bytes were written to.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: usize,
}

/// What happened to one `<img>` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageStatus {
    /// Bytes acquired and written to disk.
    Saved { artifact: Artifact },
    /// An inline reference in an encoding other than base64.
    NoContent,
    /// A per-element failure; the element was skipped.
    Failed { error: ImageError },
}

/// Per-element record, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOutcome {
    /// 0-indexed position among the page's `<img>` elements.
    pub index: usize,
    /// Attribute the reference was taken from, if any.
    pub attribute: Option<SourceAttribute>,
    /// The selected reference, as written in the markup.
    pub reference: Option<String>,
    /// Absolute URL for remote references; `None` for inline data.
    pub resolved_url: Option<String>,
    /// The `alt` text, informational only.
    pub alt: Option<String>,
    pub status: ImageStatus,
}

impl ImageOutcome {
    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.status {
            ImageStatus::Saved { artifact } => Some(artifact),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ImageError> {
        match &self.status {
            ImageStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Aggregate counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// `<img>` elements found on the page.
    pub total_images: usize,
    /// Elements that produced an artifact.
    pub saved: usize,
    /// Inline references without a supported encoding.
    pub no_content: usize,
    /// Elements skipped because of an [`ImageError`].
    pub failed: usize,
    /// Sum of artifact sizes.
    pub total_bytes: u64,
    /// Time spent acquiring and writing images.
    pub fetch_duration_ms: u64,
    pub metadata_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Complete result of a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutput {
    pub context: PageContext,
    /// One record per `<img>` element, in document order.
    pub images: Vec<ImageOutcome>,
    /// The artifact set: written paths, in document order.
    pub artifacts: Vec<PathBuf>,
    /// Per-file metadata returned by the engine.
    pub metadata: Vec<FileMetadata>,
    /// Set when the engine failed for the batch.
    pub metadata_error: Option<String>,
    pub stats: ScanStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_len_counts_characters() {
        let ctx = PageContext::new(
            Url::parse("http://x.test/").unwrap(),
            "./extracted_images",
        );
        assert_eq!(ctx.output_dir_len(), 18);
    }

    #[test]
    fn status_serialises_with_tag() {
        let outcome = ImageOutcome {
            index: 0,
            attribute: None,
            reference: None,
            resolved_url: None,
            alt: None,
            status: ImageStatus::Failed {
                error: ImageError::NoSourceAttribute,
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"]["status"], "failed");
        assert!(outcome.error().is_some());
        assert!(outcome.artifact().is_none());
    }
}
