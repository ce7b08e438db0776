//! Scoped temporary files for uploads.
//!
//! A staged file lives in the configured staging directory only while the
//! handler holds it; dropping (or closing) it removes the file on every path.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::app::errors::ApiError;

#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Write `bytes` to a fresh file under `dir`.
    pub async fn write(dir: &Path, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let dir: PathBuf = dir.to_path_buf();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| ApiError::internal(format!("staging task failed: {e}")))?
        .map_err(|e| ApiError::internal(format!("could not stage upload: {e}")))?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file now, reporting (but not failing on) removal errors.
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staged upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn staged_file_is_removed_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedFile::write(dir.path(), b"hello".to_vec()).await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        staged.close();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let staged = StagedFile::write(dir.path(), vec![1, 2, 3]).await.unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_staging_dir_is_an_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = StagedFile::write(&missing, vec![1]).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
