//! Artifact writing: persist acquired bytes under their normalised name.
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! failed write never leaves a truncated artifact behind. An existing file of
//! the same name is overwritten.

use crate::error::ImageError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `bytes` to `dir/name`, creating `dir` if needed, and return the path.
pub async fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, ImageError> {
    let path = dir.join(name);
    let failure = |e: std::io::Error| ImageError::DirectoryOrWriteFailure {
        path: path.clone(),
        detail: e.to_string(),
    };

    tokio::fs::create_dir_all(dir).await.map_err(failure)?;

    let tmp_path = dir.join(format!(".{name}.tmp"));
    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(failure(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(failure(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_directory_and_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/out");
        let path = write_artifact(&dir, "a.png", b"ABC").await.unwrap();
        assert_eq!(path, dir.join("a.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ABC");
        assert!(!dir.join(".a.png.tmp").exists());
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_artifact(tmp.path(), "x.jpg", b"first").await.unwrap();
        let path = write_artifact(tmp.path(), "x.jpg", b"2nd").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"2nd");
    }

    #[tokio::test]
    async fn directory_blocked_by_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let err = write_artifact(&blocker, "a.png", b"ABC").await.unwrap_err();
        assert!(matches!(err, ImageError::DirectoryOrWriteFailure { .. }));
    }
}
