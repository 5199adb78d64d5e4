//! Human-readable scan report, written to stdout and optionally to a log file.
//!
//! [`Reporter`] is an explicit object handed to the scan instead of a
//! process-wide logging switch. The log file is opened when the reporter is
//! built (a failure there is fatal) and flushed by [`Reporter::finish`] or,
//! on any other exit path, when the reporter is dropped.
//!
//! Colour escapes are written to the log file as well, so the file is a
//! faithful copy of the terminal output.

use crate::error::WebImgInfoError;
use crate::metadata::FileMetadata;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const GREEN: &str = "92";
const RED: &str = "91";
const BLUE: &str = "94";

/// Wrap `s` in an ANSI bright-colour escape.
pub fn paint(code: &str, s: &str) -> String {
    format!("\x1b[{code}m{s}\x1b[0m")
}

/// Sink for the scan report.
pub struct Reporter {
    console: bool,
    log_file: Mutex<Option<(PathBuf, BufWriter<File>)>>,
}

impl Reporter {
    /// Report to stdout only.
    pub fn stdout() -> Self {
        Self {
            console: true,
            log_file: Mutex::new(None),
        }
    }

    /// Report nowhere (unless a log file is added).
    pub fn silent() -> Self {
        Self {
            console: false,
            log_file: Mutex::new(None),
        }
    }

    /// Also copy every line to `path`, truncating it.
    pub fn with_log_file(self, path: impl AsRef<Path>) -> Result<Self, WebImgInfoError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| WebImgInfoError::LogFileFailed {
            path: path.clone(),
            source,
        })?;
        if let Ok(mut guard) = self.log_file.lock() {
            *guard = Some((path, BufWriter::new(file)));
        }
        Ok(self)
    }

    /// Write `s` followed by `end`.
    pub fn emit(&self, s: &str, end: &str) {
        if self.console {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let _ = handle.write_all(s.as_bytes());
            let _ = handle.write_all(end.as_bytes());
            let _ = handle.flush();
        }
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some((path, writer)) = guard.as_mut() {
                let written = writer.write_all(s.as_bytes());
                if let Err(e) = written.and_then(|_| writer.write_all(end.as_bytes())) {
                    tracing::warn!("Failed to write log file {}: {}", path.display(), e);
                }
            }
        }
    }

    pub fn line(&self, s: &str) {
        self.emit(s, "\n");
    }

    /// Text without a trailing newline.
    pub fn part(&self, s: &str) {
        self.emit(s, "");
    }

    pub fn ok(&self, s: &str) {
        self.line(&paint(GREEN, s));
    }

    pub fn ko(&self, s: &str) {
        self.line(&paint(RED, s));
    }

    pub fn info(&self, s: &str) {
        self.line(&paint(BLUE, s));
    }

    pub fn ok_part(&self, s: &str) {
        self.part(&paint(GREEN, s));
    }

    pub fn info_part(&self, s: &str) {
        self.part(&paint(BLUE, s));
    }

    /// The run header: tool name and target.
    pub fn banner(&self, url: &str) {
        self.line("WebImgInfo v1.0");
        self.part("Scraping ");
        self.ok(url);
        self.line("");
    }

    /// Print the taxonomy-grouped metadata of one file.
    pub fn file_metadata(&self, meta: &FileMetadata) {
        self.part("\nAnalyzing ");
        self.ok(&meta.source_file);

        for category in meta.categorize() {
            self.part("\n[");
            self.info_part(category.category);
            self.line("]");
            for (field, value) in category.entries {
                self.line(&format!("{field}: {value}"));
            }
        }
    }

    /// Flush and close the log file, surfacing any I/O error.
    pub fn finish(self) -> io::Result<()> {
        let taken = match self.log_file.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        match taken {
            Some((_, mut writer)) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some((_, writer)) = guard.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log_file = self
            .log_file
            .lock()
            .ok()
            .and_then(|g| g.as_ref().map(|(p, _)| p.clone()));
        f.debug_struct("Reporter")
            .field("console", &self.console)
            .field("log_file", &log_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged(f: impl FnOnce(&Reporter)) -> String {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.log");
        let reporter = Reporter::silent().with_log_file(&path).unwrap();
        f(&reporter);
        reporter.finish().unwrap();
        std::fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn colours_match_terminal_codes() {
        let out = logged(|r| {
            r.ok("ok");
            r.ko("ko");
            r.info("info");
        });
        assert_eq!(
            out,
            "\x1b[92mok\x1b[0m\n\x1b[91mko\x1b[0m\n\x1b[94minfo\x1b[0m\n"
        );
    }

    #[test]
    fn banner_layout() {
        let out = logged(|r| r.banner("https://x.test"));
        assert_eq!(
            out,
            "WebImgInfo v1.0\nScraping \x1b[92mhttps://x.test\x1b[0m\n\n"
        );
    }

    #[test]
    fn metadata_block_prints_every_category_header() {
        let meta = FileMetadata::new("out/a.jpg").with_field("EXIF:Software", "GIMP");
        let out = logged(|r| r.file_metadata(&meta));
        assert!(out.starts_with("\nAnalyzing \x1b[92mout/a.jpg\x1b[0m\n"));
        assert!(out.contains("\n[\x1b[94mnames\x1b[0m]\n"));
        assert!(out.contains("\n[\x1b[94msoftware\x1b[0m]\nEXIF:Software: GIMP\n"));
        assert!(out.contains("\n[\x1b[94mmisc/context\x1b[0m]\n"));
    }

    #[test]
    fn unwritable_log_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Reporter::silent()
            .with_log_file(tmp.path().join("missing/dir/report.log"))
            .unwrap_err();
        assert!(matches!(err, WebImgInfoError::LogFileFailed { .. }));
    }

    #[test]
    fn drop_flushes_log_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.log");
        {
            let reporter = Reporter::silent().with_log_file(&path).unwrap();
            reporter.line("hello");
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
