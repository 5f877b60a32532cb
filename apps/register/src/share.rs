//! # File Share
//!
//! Delivers exported CSV files into a directory on disk.

use std::path::PathBuf;

use retreat_core::{CoreError, CoreResult, ShareTarget};
use tracing::info;

/// Writes each shared CSV to `dir/<file_name>`.
#[derive(Debug, Clone)]
pub struct FileShare {
    dir: PathBuf,
}

impl FileShare {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileShare { dir: dir.into() }
    }
}

impl ShareTarget for FileShare {
    async fn share_csv(&self, content: &str, file_name: &str) -> CoreResult<String> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(CoreError::Share(format!("invalid file name: {:?}", file_name)));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CoreError::Share(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CoreError::Share(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = content.len(), "CSV exported");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_into_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let share = FileShare::new(tmp.path().join("exports"));

        let location = share.share_csv("a,b\n", "report.csv").await.unwrap();

        assert!(location.ends_with("report.csv"));
        assert_eq!(std::fs::read_to_string(location).unwrap(), "a,b\n");
    }

    #[tokio::test]
    async fn test_rejects_path_in_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let share = FileShare::new(tmp.path());

        let err = share.share_csv("x", "../escape.csv").await.unwrap_err();
        assert!(matches!(err, CoreError::Share(_)));
    }
}
