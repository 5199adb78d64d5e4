//! Metadata extraction from the written artifacts.
//!
//! The actual EXIF/XMP/IPTC parsing is delegated to an external engine
//! behind the [`MetadataEngine`] trait; [`ExifTool`] is the default one.
//! This module only defines the per-file result shape and groups it through
//! the fixed [`taxonomy::FIELD_TAXONOMY`].

pub mod exiftool;
pub mod taxonomy;

pub use exiftool::ExifTool;
pub use taxonomy::{FieldCategory, FIELD_TAXONOMY};

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Reads metadata for a batch of files.
///
/// Called from a blocking thread, so implementations may block freely.
/// Results are expected in input order; absent fields are absent from
/// [`FileMetadata::fields`].
pub trait MetadataEngine: Send + Sync {
    fn get_metadata(&self, files: &[PathBuf]) -> Result<Vec<FileMetadata>, MetadataError>;
}

/// Metadata reported for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File the engine read, as it reported it.
    pub source_file: String,
    /// `Group:Tag` → value.
    pub fields: BTreeMap<String, Value>,
}

/// The present fields of one taxonomy category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: &'static str,
    /// `(field name, display value)` in taxonomy order.
    pub entries: Vec<(&'static str, String)>,
}

impl FileMetadata {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The display string of `field`, if present.
    pub fn get(&self, field: &str) -> Option<String> {
        self.fields.get(field).map(display_value)
    }

    /// Every taxonomy category with its present fields, in report order.
    ///
    /// Categories without any present field are still returned, with no
    /// entries, because the report prints every category header.
    pub fn categorize(&self) -> Vec<CategoryReport> {
        FIELD_TAXONOMY
            .iter()
            .map(|cat| CategoryReport {
                category: cat.name,
                entries: cat
                    .fields
                    .iter()
                    .filter_map(|&f| self.get(f).map(|v| (f, v)))
                    .collect(),
            })
            .collect()
    }
}

/// Render a JSON value the way the report prints it.
///
/// Strings are printed bare, lists are comma-joined.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Run `engine` over `files` on the blocking pool.
pub async fn analyze(
    engine: Arc<dyn MetadataEngine>,
    files: Vec<PathBuf>,
) -> Result<Vec<FileMetadata>, MetadataError> {
    debug!("Reading metadata of {} files", files.len());
    tokio::task::spawn_blocking(move || engine.get_metadata(&files))
        .await
        .map_err(|e| MetadataError::Join(e.to_string()))?
}
