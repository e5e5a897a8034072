//! Asset references - opaque handles to stored screenshots.
//!
//! A reference is either a filesystem path (directory-backed store) or
//! the base64 payload itself (inline store). In the `screenshots`
//! column both are plain strings; inline payloads carry a `base64:`
//! prefix so the two can be told apart on the way back in.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Column prefix marking an inline reference.
pub const INLINE_PREFIX: &str = "base64:";

/// Handle by which a screenshot is retrieved or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetReference {
    /// File written by the directory-backed store.
    Path(PathBuf),
    /// Base64-encoded payload carried in the reference itself.
    Inline(String),
}

impl AssetReference {
    /// Build an inline reference from raw bytes.
    pub fn inline(bytes: &[u8]) -> Self {
        Self::Inline(STANDARD.encode(bytes))
    }

    /// Path of a path reference.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Inline(_) => None,
        }
    }

    /// Decode an inline payload. `None` for path references or bad base64.
    pub fn decode_inline(&self) -> Option<Vec<u8>> {
        match self {
            Self::Inline(data) => STANDARD.decode(data).ok(),
            Self::Path(_) => None,
        }
    }
}

impl From<String> for AssetReference {
    fn from(raw: String) -> Self {
        if let Some(data) = raw.strip_prefix(INLINE_PREFIX) {
            return Self::Inline(data.to_string());
        }
        // Older rows stored browser data URLs.
        if raw.starts_with("data:") {
            if let Some((_, data)) = raw.split_once(";base64,") {
                return Self::Inline(data.to_string());
            }
        }
        Self::Path(PathBuf::from(raw))
    }
}

impl From<AssetReference> for String {
    fn from(reference: AssetReference) -> Self {
        match reference {
            AssetReference::Path(path) => path.to_string_lossy().into_owned(),
            AssetReference::Inline(data) => format!("{INLINE_PREFIX}{data}"),
        }
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Inline(data) => write!(f, "inline({} chars)", data.len()),
        }
    }
}
