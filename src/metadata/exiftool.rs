//! [`MetadataEngine`] backed by the `exiftool` command-line program.
//!
//! Runs `exiftool -G -n -j <files…>` once per batch: `-G` prefixes every tag
//! with its group (`EXIF:Software`, `XMP:Creator`, …), `-n` disables print
//! conversion and `-j` emits one JSON object per file.

use super::{FileMetadata, MetadataEngine};
use crate::error::MetadataError;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

const BASE_ARGS: [&str; 3] = ["-G", "-n", "-j"];

/// The `exiftool` program, invoked once per batch.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: String,
}

impl ExifTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl MetadataEngine for ExifTool {
    fn get_metadata(&self, files: &[PathBuf]) -> Result<Vec<FileMetadata>, MetadataError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Running {} on {} files", self.program, files.len());
        let output = Command::new(&self.program)
            .args(BASE_ARGS)
            .args(files)
            .output()
            .map_err(|source| MetadataError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // exiftool exits 1 when some files are unreadable but still reports
        // the rest, so only an empty stdout is treated as failure.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(MetadataError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !output.status.success() {
            warn!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_output(&stdout)
    }
}

/// Parse the `-j` JSON array into per-file metadata.
pub fn parse_output(json: &str) -> Result<Vec<FileMetadata>, MetadataError> {
    let objects: Vec<Map<String, Value>> = serde_json::from_str(json)?;
    Ok(objects
        .into_iter()
        .map(|mut fields| {
            let source_file = match fields.remove("SourceFile") {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            FileMetadata {
                source_file,
                fields: fields.into_iter().collect(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[{
  "SourceFile": "./extracted_images/a.jpg",
  "ExifTool:ExifToolVersion": 12.76,
  "File:FileModifyDate": "2024:01:02 03:04:05+00:00",
  "EXIF:Software": "Adobe Photoshop 25.0",
  "EXIF:Artist": "J. Doe",
  "IPTC:Keywords": ["press", "city"]
},{
  "SourceFile": "./extracted_images/b.png",
  "PNG:ModifyDate": "2023:12:31 23:59:59"
}]"#;

    #[test]
    fn parses_grouped_json() {
        let out = parse_output(SAMPLE).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source_file, "./extracted_images/a.jpg");
        assert_eq!(out[0].get("EXIF:Artist").as_deref(), Some("J. Doe"));
        assert_eq!(out[0].get("IPTC:Keywords").as_deref(), Some("press, city"));
        assert!(!out[0].fields.contains_key("SourceFile"));
        assert_eq!(out[1].get("PNG:ModifyDate").as_deref(), Some("2023:12:31 23:59:59"));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_output("Error: File not found"),
            Err(MetadataError::Parse(_))
        ));
    }

    #[test]
    fn empty_batch_does_not_spawn() {
        let engine = ExifTool::new("definitely-not-an-installed-program");
        assert!(engine.get_metadata(&[]).unwrap().is_empty());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let engine = ExifTool::new("definitely-not-an-installed-program");
        let err = engine
            .get_metadata(&[PathBuf::from("a.jpg")])
            .unwrap_err();
        assert!(matches!(err, MetadataError::Spawn { .. }));
    }
}
