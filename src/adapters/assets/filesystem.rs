//! Filesystem Asset Store - One File per Screenshot
//!
//! Screenshots are written under a single directory with generated,
//! collision-resistant names. Writes go to a temporary file first and
//! are renamed into place, so a reference never points at a partial
//! file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use super::{asset_file_name, is_contained, load_any};
use crate::domain::{AssetReference, Timeframe};
use crate::error::{JournalError, Result};
use crate::ports::asset_store::AssetStore;

/// Directory-backed screenshot store producing `Path` references.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    /// Directory screenshots are written to.
    root: PathBuf,
}

impl FsAssetStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory screenshots are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn save(&self, timeframe: Timeframe, bytes: &[u8]) -> Result<AssetReference> {
        let path = self.root.join(asset_file_name(timeframe, bytes, Utc::now()));
        let tmp_path = path.with_extension("tmp");
        let as_asset_error = |source| JournalError::Asset { timeframe, source };

        fs::write(&tmp_path, bytes).await.map_err(as_asset_error)?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(as_asset_error(e));
        }

        info!(path = %path.display(), "Screenshot saved");
        Ok(AssetReference::Path(path))
    }

    #[instrument(skip(self), fields(reference = %reference))]
    async fn purge(&self, reference: &AssetReference) {
        let AssetReference::Path(path) = reference else {
            // Inline payloads disappear with the column value.
            return;
        };
        if !is_contained(path, Some(self.root.as_path())) {
            warn!("Refusing to delete screenshot outside the screenshot directory");
            return;
        }
        match fs::remove_file(path).await {
            Ok(()) => info!("Screenshot deleted"),
            Err(e) if e.kind() == ErrorKind::NotFound => debug!("Screenshot already gone"),
            Err(e) => warn!(error = %e, "Failed to delete screenshot"),
        }
    }

    async fn load(&self, reference: &AssetReference) -> Option<Vec<u8>> {
        load_any(reference, Some(self.root.as_path())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> FsAssetStore {
        let dir = std::env::temp_dir().join(format!("journal-assets-{}", uuid::Uuid::new_v4()));
        FsAssetStore::new(dir).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_load_purge() {
        let store = temp_store().await;
        let reference = store.save(Timeframe::H1, b"PNGDATA").await.unwrap();
        let path = reference.as_path().unwrap().to_path_buf();
        assert!(path.starts_with(store.root()));
        assert_eq!(store.load(&reference).await.as_deref(), Some(&b"PNGDATA"[..]));

        store.purge(&reference).await;
        assert!(!path.exists());
        assert!(store.load(&reference).await.is_none());

        // Second purge of a missing file is a no-op.
        store.purge(&reference).await;
    }

    #[tokio::test]
    async fn test_uncontained_paths_are_left_alone() {
        let store = temp_store().await;
        let outside = std::env::temp_dir().join(format!("journal-outside-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&outside).await.unwrap();
        let file = outside.join("keep.png");
        fs::write(&file, b"keep").await.unwrap();

        let absolute = AssetReference::Path(file.clone());
        assert!(store.load(&absolute).await.is_none());
        store.purge(&absolute).await;
        assert!(file.exists());

        let escaping = AssetReference::Path(
            store
                .root()
                .join("..")
                .join(outside.file_name().unwrap())
                .join("keep.png"),
        );
        assert!(store.load(&escaping).await.is_none());
        store.purge(&escaping).await;
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_reconcile() {
        let store = temp_store().await;
        let old = store.save(Timeframe::M5, b"old").await.unwrap();
        let new = store.save(Timeframe::M5, b"new").await.unwrap();

        store.reconcile(Some(&old), Some(&old)).await;
        assert!(store.load(&old).await.is_some());

        store.reconcile(None, Some(&new)).await;
        assert!(store.load(&new).await.is_some());

        store.reconcile(Some(&old), Some(&new)).await;
        assert!(store.load(&old).await.is_none());
        assert!(store.load(&new).await.is_some());

        store.reconcile(Some(&new), None).await;
        assert!(store.load(&new).await.is_none());
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let store = temp_store().await;
        fs::remove_dir_all(store.root()).await.unwrap();
        let err = store.save(Timeframe::Daily, b"x").await.unwrap_err();
        assert!(matches!(
            err,
            JournalError::Asset {
                timeframe: Timeframe::Daily,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_loads_inline_references() {
        let store = temp_store().await;
        let reference = AssetReference::inline(b"legacy");
        assert_eq!(store.load(&reference).await.as_deref(), Some(&b"legacy"[..]));
    }
}
