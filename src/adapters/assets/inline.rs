//! Inline Asset Store - Screenshots Embedded in the Trade Row
//!
//! Used where the deployment has no durable local disk. The reference
//! is the payload, so purging is a no-op: once the slot is overwritten
//! or the row deleted, the screenshot no longer exists anywhere.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{is_contained, load_any};
use crate::domain::{AssetReference, Timeframe};
use crate::error::Result;
use crate::ports::asset_store::AssetStore;

/// Screenshot store producing `Inline` references.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineAssetStore;

impl InlineAssetStore {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetStore for InlineAssetStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn save(&self, timeframe: Timeframe, bytes: &[u8]) -> Result<AssetReference> {
        debug!("Screenshot encoded inline");
        Ok(AssetReference::inline(bytes))
    }

    async fn purge(&self, reference: &AssetReference) {
        if let AssetReference::Path(path) = reference {
            // Left over from a filesystem deployment.
            if !is_contained(path, None) {
                warn!(
                    path = %path.display(),
                    "Refusing to delete screenshot outside the working directory"
                );
                return;
            }
            if let Err(e) = tokio::fs::remove_file(path).await {
                debug!(path = %path.display(), error = %e, "Legacy screenshot not removed");
            }
        }
    }

    async fn load(&self, reference: &AssetReference) -> Option<Vec<u8>> {
        load_any(reference, None).await
    }
}
