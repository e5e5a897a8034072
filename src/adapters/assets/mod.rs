//! Asset Adapters - Screenshot Storage
//!
//! Two implementations of the `AssetStore` port, selected once per
//! deployment by configuration:
//! - `FsAssetStore`: one file per screenshot under a directory
//! - `InlineAssetStore`: base64 payload carried in the reference
//!
//! Both can load and purge either reference variant, so a database
//! that switched modes keeps rendering its older screenshots.

pub mod filesystem;
pub mod inline;

pub use filesystem::FsAssetStore;
pub use inline::InlineAssetStore;

use std::path::{Component, Path};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::domain::{AssetReference, Timeframe};

/// Process-wide save counter mixed into generated names.
static SAVE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// File extension guessed from the payload's magic bytes.
pub fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else {
        "bin"
    }
}

/// Collision-resistant file name for a screenshot saved at `now`.
///
/// `{timeframe}_{YYYYmmdd_HHMMSS_micros}_{seq}_{uuid8}.{ext}`
pub fn asset_file_name(timeframe: Timeframe, bytes: &[u8], now: DateTime<Utc>) -> String {
    let seq = SAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{seq}_{}.{}",
        timeframe,
        now.format("%Y%m%d_%H%M%S_%6f"),
        &nonce[..8],
        sniff_extension(bytes)
    )
}

/// Whether a stored path may be read or deleted.
///
/// Paths under `root` are allowed as long as the remainder does not climb
/// back out of it. Anything else must be relative without `..`, i.e. stay
/// inside the working directory where older revisions wrote screenshots.
pub(crate) fn is_contained(path: &Path, root: Option<&Path>) -> bool {
    let climbs = |p: &Path| p.components().any(|c| c == Component::ParentDir);
    if let Some(rest) = root.and_then(|root| path.strip_prefix(root).ok()) {
        return !climbs(rest);
    }
    path.is_relative() && !climbs(path)
}

/// Load an inline reference, or read a contained path reference from disk.
pub(crate) async fn load_any(reference: &AssetReference, root: Option<&Path>) -> Option<Vec<u8>> {
    match reference {
        AssetReference::Path(path) if !is_contained(path, root) => {
            tracing::warn!(
                path = %path.display(),
                "Refusing to read screenshot outside the screenshot directory"
            );
            None
        }
        AssetReference::Inline(_) => {
            let bytes = reference.decode_inline();
            if bytes.is_none() {
                tracing::warn!(%reference, "Inline screenshot is not valid base64");
            }
            bytes
        }
        AssetReference::Path(path) => match tokio::fs::read(path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Screenshot unavailable");
                None
            }
        },
    }
}
