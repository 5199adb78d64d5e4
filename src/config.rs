//! Configuration types for a page scan.
//!
//! All scan behaviour is controlled through [`ScanConfig`], built via its
//! [`ScanConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config between the CLI and library callers and to log the
//! exact settings of a run.

use crate::error::WebImgInfoError;
use crate::metadata::{ExifTool, MetadataEngine};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Directory the CLI extracts images into.
pub const DEFAULT_OUTPUT_DIR: &str = "./extracted_images";

/// Upper bound on `len(output_dir) + len(file name)`.
pub const DEFAULT_MAX_PATH_LEN: usize = 200;

/// Configuration for a page scan.
///
/// Built via [`ScanConfig::builder()`] or using [`ScanConfig::default()`].
///
/// # Example
/// ```rust
/// use webimginfo::{ScanConfig, UrlResolution};
///
/// let config = ScanConfig::builder()
///     .output_dir("/tmp/images")
///     .resolution(UrlResolution::Legacy)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ScanConfig {
    /// Directory receiving the extracted images. Default: `./extracted_images`.
    pub output_dir: PathBuf,

    /// Bound on the output directory length plus the artifact file name. Default: 200.
    ///
    /// File names are truncated to `max_path_len - len(output_dir)` characters.
    pub max_path_len: usize,

    /// How relative references are turned into absolute URLs. Default: [`UrlResolution::Rfc3986`].
    pub resolution: UrlResolution,

    /// Per-image GET timeout in seconds; 0 disables it. Default: 30.
    pub request_timeout_secs: u64,

    /// Timeout for the top-level page GET in seconds; 0 disables it. Default: 60.
    pub page_timeout_secs: u64,

    /// Number of image fetches in flight at once. Default: 1 (sequential).
    ///
    /// Results are always reported and written in document order, whatever
    /// the value.
    pub concurrency: usize,

    /// Hand the artifact set to the metadata engine once the page is done. Default: true.
    pub analyze_metadata: bool,

    /// Program used by the default [`ExifTool`] engine. Default: `exiftool`.
    pub exiftool_path: String,

    /// Pre-constructed metadata engine. Takes precedence over `exiftool_path`.
    pub metadata_engine: Option<Arc<dyn MetadataEngine>>,

    /// Optional progress events, e.g. for a terminal progress bar.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_path_len: DEFAULT_MAX_PATH_LEN,
            resolution: UrlResolution::default(),
            request_timeout_secs: 30,
            page_timeout_secs: 60,
            concurrency: 1,
            analyze_metadata: true,
            exiftool_path: "exiftool".to_string(),
            metadata_engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("output_dir", &self.output_dir)
            .field("max_path_len", &self.max_path_len)
            .field("resolution", &self.resolution)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("analyze_metadata", &self.analyze_metadata)
            .field("exiftool_path", &self.exiftool_path)
            .field(
                "metadata_engine",
                &self.metadata_engine.as_ref().map(|_| "<dyn MetadataEngine>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ScanProgressCallback>"),
            )
            .finish()
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }

    /// The engine to hand artifacts to, or `None` when analysis is disabled.
    pub fn engine(&self) -> Option<Arc<dyn MetadataEngine>> {
        if !self.analyze_metadata {
            return None;
        }
        match self.metadata_engine {
            Some(ref engine) => Some(Arc::clone(engine)),
            None => Some(Arc::new(ExifTool::new(self.exiftool_path.clone()))),
        }
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn max_path_len(mut self, n: usize) -> Self {
        self.config.max_path_len = n;
        self
    }

    pub fn resolution(mut self, mode: UrlResolution) -> Self {
        self.config.resolution = mode;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn analyze_metadata(mut self, v: bool) -> Self {
        self.config.analyze_metadata = v;
        self
    }

    pub fn exiftool_path(mut self, program: impl Into<String>) -> Self {
        self.config.exiftool_path = program.into();
        self
    }

    pub fn metadata_engine(mut self, engine: Arc<dyn MetadataEngine>) -> Self {
        self.config.metadata_engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScanConfig, WebImgInfoError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(WebImgInfoError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        let dir_len = c.output_dir.to_string_lossy().chars().count();
        if dir_len >= c.max_path_len {
            return Err(WebImgInfoError::InvalidConfig(format!(
                "Output directory '{}' ({} chars) leaves no room for file names under the {}-char path bound",
                c.output_dir.display(),
                dir_len,
                c.max_path_len
            )));
        }
        if c.analyze_metadata && c.metadata_engine.is_none() && c.exiftool_path.trim().is_empty() {
            return Err(WebImgInfoError::InvalidConfig(
                "exiftool path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a candidate reference is made absolute.
///
/// | Mode | Absolute test | Relative references |
/// |------|---------------|---------------------|
/// | `Rfc3986` | parses as a URL with a scheme | joined against the page URL |
/// | `Legacy` | contains `"http"` anywhere | appended to `scheme://host[:port]` |
///
/// `Legacy` reproduces the historical webimginfo output byte for byte,
/// including its misclassification of references such as `/search?q=http`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UrlResolution {
    /// Scheme inspection plus RFC 3986 reference resolution. (default)
    #[default]
    Rfc3986,
    /// Substring test plus plain string concatenation.
    Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_behaviour() {
        let c = ScanConfig::default();
        assert_eq!(c.output_dir, PathBuf::from("./extracted_images"));
        assert_eq!(c.max_path_len, 200);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.resolution, UrlResolution::Rfc3986);
        assert!(c.analyze_metadata);
    }

    #[test]
    fn concurrency_is_clamped_to_one() {
        let c = ScanConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn output_dir_longer_than_bound_is_rejected() {
        let err = ScanConfig::builder()
            .output_dir("a".repeat(50))
            .max_path_len(40)
            .build()
            .unwrap_err();
        assert!(matches!(err, WebImgInfoError::InvalidConfig(_)));
    }

    #[test]
    fn engine_is_none_when_analysis_disabled() {
        let c = ScanConfig::builder()
            .analyze_metadata(false)
            .build()
            .unwrap();
        assert!(c.engine().is_none());
    }

    #[test]
    fn default_engine_is_exiftool() {
        let c = ScanConfig::default();
        assert!(c.engine().is_some());
    }
}
