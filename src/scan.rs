//! Page scan entry points: the orchestration of every pipeline stage.
//!
//! The page's `<img>` elements are collected first; the parsed document is
//! dropped before any `.await`, since `scraper::Html` is not `Send`. Each
//! element then goes through three stages:
//!
//! 1. **Prepare** (sync) — select the reference, decode inline data, resolve
//!    remote URLs.
//! 2. **Acquire** (async) — GET the remote reference.
//! 3. **Finish** — report, normalise and write the element.
//!
//! Elements are pulled lazily from an ordered stream, at most
//! `config.concurrency` in flight at once. Each element is finished before
//! the next one is pulled, so with the default concurrency of 1 an image is
//! fully written before the next request goes out, and file names and
//! overwrite order stay deterministic whatever the concurrency.
//!
//! The resulting artifact set is then handed to the metadata engine.

use crate::config::ScanConfig;
use crate::error::{ImageError, WebImgInfoError};
use crate::metadata;
use crate::output::{Artifact, ImageOutcome, ImageStatus, PageContext, ScanOutput, ScanStats};
use crate::pipeline::acquire::{self, ResolvedSource};
use crate::pipeline::extract::{self, ImageReference, SelectedSource};
use crate::pipeline::{normalize, write};
use crate::report::Reporter;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Fetch `url`, extract every image and report its metadata.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ScanOutput)` even when individual images failed
/// (check `output.stats.failed`).
///
/// # Errors
/// Returns `Err(WebImgInfoError)` only for fatal errors:
/// - `url` is not an absolute HTTP/HTTPS URL
/// - the page itself cannot be fetched
pub async fn scan(
    url: impl AsRef<str>,
    config: &ScanConfig,
    reporter: &Reporter,
) -> Result<ScanOutput, WebImgInfoError> {
    let total_start = Instant::now();
    let url = url.as_ref();
    info!("Starting scan: {}", url);

    let page_url = parse_target(url)?;
    reporter.banner(url);

    let client = build_client()?;
    let html = fetch_page(&client, &page_url, config.page_timeout_secs).await?;

    let context = PageContext::new(page_url, config.output_dir.clone());
    run(&client, &html, context, config, reporter, total_start).await
}

/// Scan already-downloaded HTML as if it had been served from `page_url`.
///
/// Relative references are resolved against `page_url`; remote images are
/// still fetched.
pub async fn scan_html(
    html: &str,
    page_url: impl AsRef<str>,
    config: &ScanConfig,
    reporter: &Reporter,
) -> Result<ScanOutput, WebImgInfoError> {
    let total_start = Instant::now();
    let page_url = parse_target(page_url.as_ref())?;
    let client = build_client()?;
    let context = PageContext::new(page_url, config.output_dir.clone());
    run(&client, html, context, config, reporter, total_start).await
}

/// Synchronous wrapper around [`scan`].
///
/// Creates a temporary tokio runtime internally.
pub fn scan_sync(
    url: impl AsRef<str>,
    config: &ScanConfig,
    reporter: &Reporter,
) -> Result<ScanOutput, WebImgInfoError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| WebImgInfoError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(scan(url, config, reporter))
}

/// Download the page body.
///
/// A non-success status is logged but the body is still scanned: error
/// pages embed images too.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &Url,
    timeout_secs: u64,
) -> Result<String, WebImgInfoError> {
    let mut request = client.get(url.clone());
    if timeout_secs > 0 {
        request = request.timeout(Duration::from_secs(timeout_secs));
    }

    let fetch_error = |e: reqwest::Error| {
        if e.is_timeout() {
            WebImgInfoError::PageTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            WebImgInfoError::PageFetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = request.send().await.map_err(fetch_error)?;
    if !response.status().is_success() {
        warn!("Page {} answered HTTP {}", url, response.status());
    }
    let body = response.text().await.map_err(fetch_error)?;
    debug!("Fetched page {} ({} bytes)", url, body.len());
    Ok(body)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Parse the user-supplied target, accepting only HTTP(S) URLs.
fn parse_target(url: &str) -> Result<Url, WebImgInfoError> {
    let parsed = Url::parse(url).map_err(|e| WebImgInfoError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(WebImgInfoError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// One client per run: no cookie store, no default headers.
fn build_client() -> Result<reqwest::Client, WebImgInfoError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| WebImgInfoError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Where an element stands between the prepare and finish passes.
enum Content {
    /// Bytes (or "no content") known, or the element already failed.
    Ready(Result<Option<Vec<u8>>, ImageError>),
    /// Still to be fetched.
    Remote(String),
}

struct Pending {
    index: usize,
    alt: Option<String>,
    selected: Option<SelectedSource>,
    resolved_url: Option<String>,
    content: Content,
}

fn prepare(index: usize, image: ImageReference, page: &Url, config: &ScanConfig) -> Pending {
    let selected = image.source();
    let mut pending = Pending {
        index,
        alt: image.alt,
        selected: selected.as_ref().ok().cloned(),
        resolved_url: None,
        content: Content::Ready(Ok(None)),
    };

    let selected = match selected {
        Ok(s) => s,
        Err(e) => {
            pending.content = Content::Ready(Err(e));
            return pending;
        }
    };
    debug!(
        "Image {}: {}=\"{}\"",
        index,
        selected.attribute.name(),
        selected.reference
    );

    pending.content = match acquire::resolve_source(&selected.reference, page, config.resolution)
    {
        Ok(Some(ResolvedSource::RemoteUrl(url))) => {
            pending.resolved_url = Some(url.clone());
            Content::Remote(url)
        }
        Ok(Some(ResolvedSource::InlineData(bytes))) => Content::Ready(Ok(Some(bytes))),
        Ok(None) => Content::Ready(Ok(None)),
        Err(e) => Content::Ready(Err(e)),
    };
    pending
}

async fn fetch_pending(client: &reqwest::Client, mut pending: Pending, timeout_secs: u64) -> Pending {
    if let Content::Remote(ref url) = pending.content {
        let result = acquire::fetch(client, url, timeout_secs).await;
        pending.content = Content::Ready(result.map(Some));
    }
    pending
}

/// Report the failure the way the scan log always has.
fn report_failure(reporter: &Reporter, error: &ImageError) {
    match error {
        ImageError::MalformedDataScheme { reference } => {
            reporter.ko("Could not parse data: scheme");
            reporter.ko(reference);
        }
        ImageError::DecodeFailure { reference, .. } => {
            reporter.ko("Could not decode base64");
            reporter.ko(reference);
        }
        ImageError::FetchFailure { url, .. } => {
            reporter.ko(&format!("Could not request image URL {url}"));
        }
        ImageError::BadStatus { url, .. } => {
            reporter.ko(&format!("Could not extract image with source {url}"));
        }
        other => reporter.ko(&other.to_string()),
    }
}

/// Whether the element got far enough for its `alt` text to be shown.
fn shows_alt(content: &Result<Option<Vec<u8>>, ImageError>) -> bool {
    !matches!(
        content,
        Err(ImageError::NoSourceAttribute)
            | Err(ImageError::FetchFailure { .. })
            | Err(ImageError::BadStatus { .. })
    )
}

/// Report, normalise and write one element.
async fn finish(
    pending: Pending,
    context: &PageContext,
    config: &ScanConfig,
    reporter: &Reporter,
) -> ImageOutcome {
    let Pending {
        index,
        alt,
        selected,
        resolved_url,
        content,
    } = pending;

    let content = match content {
        Content::Ready(result) => result,
        // fetch_pending always settles remote content
        Content::Remote(url) => Err(ImageError::FetchFailure {
            url,
            detail: "not fetched".into(),
        }),
    };

    let mut outcome = ImageOutcome {
        index,
        attribute: selected.as_ref().map(|s| s.attribute),
        reference: selected.as_ref().map(|s| s.reference.clone()),
        resolved_url: resolved_url.clone(),
        alt: alt.clone(),
        status: ImageStatus::NoContent,
    };

    if let Err(ref e) = content {
        report_failure(reporter, e);
    } else if let Some(ref url) = resolved_url {
        reporter.line(&format!("src: {url}"));
    }
    if shows_alt(&content) {
        if let Some(ref alt) = alt {
            reporter.line(&format!("alt: {alt}"));
        }
    }

    let bytes = match content {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            reporter.ko("No content for image");
            return outcome;
        }
        Err(error) => {
            warn!("Image {} skipped: {}", index, error);
            reporter.ko("No content for image");
            outcome.status = ImageStatus::Failed { error };
            return outcome;
        }
    };

    // Inline images are named after the data: reference itself.
    let name_source = resolved_url
        .as_deref()
        .or(selected.as_ref().map(|s| s.reference.as_str()))
        .unwrap_or_default();

    let written = match normalize::normalize_name(
        name_source,
        context.output_dir_len(),
        config.max_path_len,
    ) {
        Ok(name) => {
            reporter.line(&format!(
                "Writing to disk as {}",
                context.output_dir.join(&name).display()
            ));
            write::write_artifact(&context.output_dir, &name, &bytes)
                .await
                .map(|path| Artifact {
                    name,
                    path,
                    size: bytes.len(),
                })
        }
        Err(e) => Err(e),
    };

    outcome.status = match written {
        Ok(artifact) => ImageStatus::Saved { artifact },
        Err(error) => {
            warn!("Image {} not written: {}", index, error);
            reporter.ko(&error.to_string());
            ImageStatus::Failed { error }
        }
    };
    outcome
}

async fn run(
    client: &reqwest::Client,
    html: &str,
    context: PageContext,
    config: &ScanConfig,
    reporter: &Reporter,
    total_start: Instant,
) -> Result<ScanOutput, WebImgInfoError> {
    // ── Step 1: Extract image references ─────────────────────────────────
    let images = extract::find_images_in_html(html);
    let total = images.len();
    info!("Found {} <img> elements on {}", total, context.url);

    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_start(total);
    }

    // ── Step 2: Prepare, acquire, report and write in document order ─────
    // The stream is lazy: at most `concurrency` elements are prepared and
    // in flight at once, and each one is written before the next is pulled.
    let fetch_start = Instant::now();
    let page_url = context.url.clone();
    let mut acquired = std::pin::pin!(stream::iter(images.into_iter().enumerate().map(
        |(i, image)| {
            let pending = prepare(i, image, &page_url, config);
            fetch_pending(client, pending, config.request_timeout_secs)
        }
    ))
    .buffered(config.concurrency));

    let mut outcomes = Vec::with_capacity(total);
    let mut artifacts: Vec<PathBuf> = Vec::new();

    while let Some(pending) = acquired.next().await {
        let index = pending.index;
        reporter.line("\nAnalyzing new image tag");
        if let Some(ref cb) = config.progress_callback {
            cb.on_image_start(index, total);
        }

        let outcome = finish(pending, &context, config, reporter).await;

        match &outcome.status {
            ImageStatus::Saved { artifact } => {
                artifacts.push(artifact.path.clone());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_saved(index, total, artifact);
                }
            }
            ImageStatus::NoContent => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_skipped(index, total, "no content");
                }
            }
            ImageStatus::Failed { error } => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_skipped(index, total, &error.to_string());
                }
            }
        }
        outcomes.push(outcome);
    }

    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(total, artifacts.len());
    }

    // ── Step 3: Metadata ─────────────────────────────────────────────────
    let metadata_start = Instant::now();
    let mut metadata_error = None;
    let mut file_metadata = Vec::new();

    let engine = if artifacts.is_empty() {
        None
    } else {
        config.engine()
    };
    if let Some(engine) = engine {
        match metadata::analyze(engine, artifacts.clone()).await {
            Ok(list) => {
                for meta in &list {
                    reporter.file_metadata(meta);
                }
                file_metadata = list;
            }
            Err(e) => {
                warn!("Metadata engine failed: {}", e);
                let listed: Vec<String> = artifacts
                    .iter()
                    .map(|p| format!("'{}'", p.display()))
                    .collect();
                reporter.line(&format!("[{}]", listed.join(", ")));
                reporter.ko("Could not parse images with exiftool");
                metadata_error = Some(e.to_string());
            }
        }
    }
    let metadata_duration_ms = metadata_start.elapsed().as_millis() as u64;

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let stats = ScanStats {
        total_images: total,
        saved: artifacts.len(),
        no_content: outcomes
            .iter()
            .filter(|o| matches!(o.status, ImageStatus::NoContent))
            .count(),
        failed: outcomes.iter().filter(|o| o.error().is_some()).count(),
        total_bytes: outcomes
            .iter()
            .filter_map(|o| o.artifact())
            .map(|a| a.size as u64)
            .sum(),
        fetch_duration_ms,
        metadata_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Scan complete: {}/{} images saved, {}ms total",
        stats.saved, stats.total_images, stats.total_duration_ms
    );

    Ok(ScanOutput {
        context,
        images: outcomes,
        artifacts,
        metadata: file_metadata,
        metadata_error,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UrlResolution;

    fn page() -> Url {
        Url::parse("http://x.test/a/b.html").unwrap()
    }

    fn prepare_html(html: &str, config: &ScanConfig) -> Vec<Pending> {
        extract::find_images_in_html(html)
            .into_iter()
            .enumerate()
            .map(|(i, img)| prepare(i, img, &page(), config))
            .collect()
    }

    #[test]
    fn target_must_be_http() {
        assert!(parse_target("https://x.test/").is_ok());
        assert!(matches!(
            parse_target("ftp://x.test/"),
            Err(WebImgInfoError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_target("not a url"),
            Err(WebImgInfoError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn prepare_resolves_relative_src() {
        let p = prepare_html(r#"<img src="pic.jpg">"#, &ScanConfig::default());
        assert_eq!(p[0].resolved_url.as_deref(), Some("http://x.test/a/pic.jpg"));
        assert!(matches!(p[0].content, Content::Remote(_)));
    }

    #[test]
    fn prepare_legacy_resolution() {
        let config = ScanConfig::builder()
            .resolution(UrlResolution::Legacy)
            .build()
            .unwrap();
        let p = prepare_html(r#"<img data-src="/foo.png" src="placeholder.gif">"#, &config);
        assert_eq!(p[0].selected.as_ref().unwrap().reference, "/foo.png");
        assert_eq!(p[0].resolved_url.as_deref(), Some("http://x.test/foo.png"));
    }

    #[test]
    fn prepare_decodes_inline_data() {
        let p = prepare_html(
            r#"<img src="data:image/png;base64,QUJD">"#,
            &ScanConfig::default(),
        );
        assert!(p[0].resolved_url.is_none());
        assert!(matches!(&p[0].content, Content::Ready(Ok(Some(b))) if b == b"ABC"));
    }

    #[test]
    fn prepare_records_missing_source() {
        let p = prepare_html(r#"<img alt="x">"#, &ScanConfig::default());
        assert!(p[0].selected.is_none());
        assert!(matches!(
            p[0].content,
            Content::Ready(Err(ImageError::NoSourceAttribute))
        ));
    }

    #[test]
    fn alt_visibility_follows_failure_kind() {
        assert!(shows_alt(&Ok(None)));
        assert!(shows_alt(&Err(ImageError::DecodeFailure {
            reference: "data:,".into(),
            detail: "bad".into()
        })));
        assert!(!shows_alt(&Err(ImageError::NoSourceAttribute)));
        assert!(!shows_alt(&Err(ImageError::BadStatus {
            url: "u".into(),
            status: 404
        })));
    }
}
