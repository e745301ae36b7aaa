//! Per-fetch scratch directories

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A freshly created, uniquely named directory under the scratch root.
///
/// Nothing is removed on drop; the owner decides when to clean up so the
/// fetched file can outlive the fetch call.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create `<root>/cycle-<uuid>`
    pub async fn create(root: &Path) -> Result<Self> {
        let path = root.join(format!("cycle-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&path)
            .await
            .with_context(|| format!("Failed to create scratch dir {}", path.display()))?;
        debug!("Allocated scratch dir {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First regular file in the directory, with its size in bytes
    pub async fn first_file(&self) -> Result<Option<(PathBuf, u64)>> {
        let mut entries = tokio::fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                return Ok(Some((entry.path(), metadata.len())));
            }
        }
        Ok(None)
    }

    /// Remove the directory and anything left in it; failures are logged
    pub async fn remove_all(&self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove scratch dir {}: {}", self.path.display(), e);
            }
        }
    }

    /// Remove the directory only if nothing is left in it.
    ///
    /// Returns whether the directory is gone afterwards.
    pub async fn remove_if_empty(&self) -> Result<bool> {
        let mut entries = match tokio::fs::read_dir(&self.path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        if entries.next_entry().await?.is_some() {
            return Ok(false);
        }
        tokio::fs::remove_dir(&self.path).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_scratch_dirs_are_unique() {
        let root = tempdir().unwrap();
        let a = ScratchDir::create(root.path()).await.unwrap();
        let b = ScratchDir::create(root.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
    }

    #[tokio::test]
    async fn test_remove_if_empty_keeps_non_empty_dir() {
        let root = tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).await.unwrap();
        tokio::fs::write(scratch.path().join("left.txt"), b"x")
            .await
            .unwrap();

        assert!(!scratch.remove_if_empty().await.unwrap());
        assert!(scratch.path().exists());

        tokio::fs::remove_file(scratch.path().join("left.txt"))
            .await
            .unwrap();
        assert!(scratch.remove_if_empty().await.unwrap());
        assert!(!scratch.path().exists());
    }

    #[tokio::test]
    async fn test_first_file_reports_size() {
        let root = tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).await.unwrap();
        assert!(scratch.first_file().await.unwrap().is_none());

        tokio::fs::write(scratch.path().join("song.mp3"), vec![0u8; 2048])
            .await
            .unwrap();
        let (path, size) = scratch.first_file().await.unwrap().unwrap();
        assert!(path.ends_with("song.mp3"));
        assert_eq!(size, 2048);

        scratch.remove_all().await;
        assert!(!scratch.path().exists());
    }
}
