//! CLI binary for webimginfo.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ScanConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webimginfo::{
    scan, Artifact, ProgressCallback, Reporter, ScanConfig, ScanProgressCallback, UrlResolution,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar on stderr, one tick per `<img>` element.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Fetching");
        bar.set_message("page…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, total_images: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} images  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_images as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }

    fn on_image_saved(&self, _index: usize, _total: usize, artifact: &Artifact) {
        self.bar.set_message(artifact.name.clone());
        self.bar.inc(1);
    }

    fn on_image_skipped(&self, _index: usize, _total: usize, _reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
    }

    fn on_scan_complete(&self, total: usize, saved: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        eprintln!(
            "{} {}/{} images extracted{}",
            if saved == total { green("✔") } else { cyan("⚠") },
            bold(&saved.to_string()),
            total,
            if skipped > 0 {
                format!("  ({} skipped)", red(&skipped.to_string()))
            } else {
                String::new()
            }
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan a page, report to the terminal
  webimginfo https://example.com/article

  # Keep a copy of the report
  webimginfo https://example.com/article -o report.txt

  # Resolve relative references exactly like webimginfo 1.0
  webimginfo --legacy-urls https://example.com/

  # Fetch 8 images at a time, machine-readable output
  webimginfo --concurrency 8 --json https://example.com/ > scan.json

REQUIREMENTS:
  exiftool must be on PATH (or passed with --exiftool) for the metadata
  report. Without it images are still extracted to ./extracted_images.
"#;

/// Extract images from a web page and report their metadata.
#[derive(Parser, Debug)]
#[command(
    name = "webimginfo",
    version,
    about = "Extract the images of a web page and report the metadata they leak",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// URL to get images from.
    url: String,

    /// Output filename: also write the report to this file.
    #[arg(short, long, env = "WEBIMGINFO_OUT")]
    out: Option<PathBuf>,

    /// Directory extracted images are written to.
    #[arg(long, env = "WEBIMGINFO_OUTPUT_DIR", default_value = webimginfo::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Treat references containing "http" as absolute and append others to the host.
    #[arg(long, env = "WEBIMGINFO_LEGACY_URLS")]
    legacy_urls: bool,

    /// Number of image fetches in flight at once.
    #[arg(short, long, env = "WEBIMGINFO_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Per-image request timeout in seconds (0 = none).
    #[arg(long, env = "WEBIMGINFO_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Page request timeout in seconds (0 = none).
    #[arg(long, env = "WEBIMGINFO_PAGE_TIMEOUT", default_value_t = 60)]
    page_timeout: u64,

    /// Skip the metadata report; only extract images.
    #[arg(long, env = "WEBIMGINFO_NO_METADATA")]
    no_metadata: bool,

    /// exiftool executable.
    #[arg(long, env = "WEBIMGINFO_EXIFTOOL", default_value = "exiftool")]
    exiftool: String,

    /// Print the scan as JSON instead of the coloured report.
    #[arg(long, env = "WEBIMGINFO_JSON")]
    json: bool,

    /// Show a progress bar on stderr.
    #[arg(long, env = "WEBIMGINFO_PROGRESS")]
    progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WEBIMGINFO_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "WEBIMGINFO_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The report on stdout is the primary output; tracing goes to stderr.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Reporter ─────────────────────────────────────────────────────────
    let reporter = if cli.json {
        Reporter::silent()
    } else {
        Reporter::stdout()
    };
    let reporter = match cli.out {
        Some(ref path) => reporter
            .with_log_file(path)
            .with_context(|| format!("Cannot write report to {}", path.display()))?,
        None => reporter,
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.progress && !cli.quiet {
        Some(CliProgressCallback::new() as Arc<dyn ScanProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run scan ─────────────────────────────────────────────────────────
    let output = scan(&cli.url, &config, &reporter)
        .await
        .context("Scan failed")?;

    reporter.finish().context("Failed to flush report file")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}",
            dim(&format!(
                "{}/{} images saved to {}  ({} bytes, {}ms)",
                output.stats.saved,
                output.stats.total_images,
                output.context.output_dir.display(),
                output.stats.total_bytes,
                output.stats.total_duration_ms,
            ))
        );
    }

    Ok(())
}

/// Map CLI args to `ScanConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ScanConfig> {
    let resolution = if cli.legacy_urls {
        UrlResolution::Legacy
    } else {
        UrlResolution::Rfc3986
    };

    let mut builder = ScanConfig::builder()
        .output_dir(cli.output_dir.clone())
        .resolution(resolution)
        .concurrency(cli.concurrency)
        .request_timeout_secs(cli.timeout)
        .page_timeout_secs(cli.page_timeout)
        .analyze_metadata(!cli.no_metadata)
        .exiftool_path(cli.exiftool.clone());

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
