//! # webimginfo
//!
//! Scrape every image of a web page and report the metadata its authors and
//! publishers did not mean to expose: names, addresses, e-mails, dates,
//! platform and software lineage.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page URL
//!  │
//!  ├─ 1. Fetch     GET the page, parse it, collect every <img> in order
//!  ├─ 2. Extract   data-srcset > srcset > data-src > data-lazy > src
//!  ├─ 3. Resolve   relative → absolute URL, or decode inline base64 data
//!  ├─ 4. Acquire   single GET per image, no retry
//!  ├─ 5. Persist   bounded, filesystem-safe name under ./extracted_images
//!  └─ 6. Metadata  exiftool over the artifact set, grouped by field taxonomy
//! ```
//!
//! Every per-image failure is logged and skipped; only a page that cannot be
//! fetched aborts the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use webimginfo::{scan, Reporter, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::default();
//!     let reporter = Reporter::stdout();
//!     let output = scan("https://example.com/", &config, &reporter).await?;
//!     eprintln!("{}/{} images saved", output.stats.saved, output.stats.total_images);
//!     reporter.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `webimginfo` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! The default metadata engine shells out to
//! [ExifTool](https://exiftool.org/), which must be on `PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scan;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ScanConfig, ScanConfigBuilder, UrlResolution, DEFAULT_MAX_PATH_LEN, DEFAULT_OUTPUT_DIR};
pub use error::{ImageError, MetadataError, WebImgInfoError};
pub use metadata::{ExifTool, FileMetadata, MetadataEngine, FIELD_TAXONOMY};
pub use output::{Artifact, ImageOutcome, ImageStatus, PageContext, ScanOutput, ScanStats};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use report::Reporter;
pub use scan::{fetch_page, scan, scan_html, scan_sync};
