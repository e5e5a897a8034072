//! Asset Store Port - Screenshot Blob Lifecycle Interface
//!
//! Saving is the only fallible operation. Deletion and loading absorb
//! their failures: a dangling file is a lesser harm than losing a
//! journal entry, and a missing screenshot renders as "no screenshot".

use async_trait::async_trait;

use crate::domain::{AssetReference, Timeframe};
use crate::error::Result;

/// Trait for screenshot storage providers.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
  /// Persist `bytes` for `timeframe` and return a fresh reference.
  ///
  /// References are unique across concurrent saves in one process.
  async fn save(&self, timeframe: Timeframe, bytes: &[u8]) -> Result<AssetReference>;

  /// Delete the asset behind `reference` if it exists. Failures are
  /// logged, never returned.
  async fn purge(&self, reference: &AssetReference);

  /// Read an asset back. `None` when missing or unreadable.
  async fn load(&self, reference: &AssetReference) -> Option<Vec<u8>>;

  /// Purge `old` when a slot moves from `old` to `new` and they differ.
  ///
  /// Self-replacement and empty slots are no-ops.
  async fn reconcile(&self, old: Option<&AssetReference>, new: Option<&AssetReference>) {
    if let Some(old) = old {
      if Some(old) != new {
        self.purge(old).await;
      }
    }
  }
}
