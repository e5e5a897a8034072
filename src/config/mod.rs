//! Configuration Module - TOML-based Journal Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides. Every section has defaults, so an
//! empty file (or none at all) yields a working local setup:
//! `data/trades.db` with screenshots under `data/screenshots`.

pub mod loader;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Top-level journal configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Identity and logging.
  #[serde(default)]
  pub journal: JournalConfig,
  /// Relational store.
  #[serde(default)]
  pub database: DatabaseConfig,
  /// Screenshot storage.
  #[serde(default)]
  pub assets: AssetsConfig,
}

/// Journal identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
  /// Human-readable journal name, shown in startup logs.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for JournalConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

/// SQLite connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  /// sqlx SQLite URL.
  #[serde(default = "default_database_url")]
  pub url: String,
  /// Pool size.
  #[serde(default = "default_max_connections")]
  pub max_connections: u32,
  /// Seconds to wait for a pooled connection before failing.
  #[serde(default = "default_acquire_timeout")]
  pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self {
      url: default_database_url(),
      max_connections: default_max_connections(),
      acquire_timeout_seconds: default_acquire_timeout(),
    }
  }
}

/// How screenshots are stored. Chosen once per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
  /// One file per screenshot under `screenshot_dir`.
  #[default]
  Path,
  /// Base64 payload stored in the trade row.
  Inline,
}

impl fmt::Display for AssetMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Path => write!(f, "path"),
      Self::Inline => write!(f, "inline"),
    }
  }
}

impl FromStr for AssetMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "path" => Ok(Self::Path),
      "inline" => Ok(Self::Inline),
      other => Err(format!("unknown asset mode: {other}")),
    }
  }
}

/// Screenshot storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
  #[serde(default)]
  pub mode: AssetMode,
  /// Directory for `path` mode.
  #[serde(default = "default_screenshot_dir")]
  pub screenshot_dir: String,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      mode: AssetMode::default(),
      screenshot_dir: default_screenshot_dir(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "Forex Journal".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_database_url() -> String {
  "sqlite://data/trades.db".to_string()
}

fn default_max_connections() -> u32 {
  5
}

fn default_acquire_timeout() -> u64 {
  15
}

fn default_screenshot_dir() -> String {
  "data/screenshots".to_string()
}
