//! Configuration Loader - File Loading, Overrides and Validation
//!
//! Handles loading `config.toml`, applying `JOURNAL_*` environment
//! overrides, validating all parameters, and providing clear error
//! messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, AssetMode};

/// Overrides the database URL.
pub const ENV_DATABASE_URL: &str = "JOURNAL_DATABASE_URL";
/// Overrides the screenshot directory.
pub const ENV_SCREENSHOT_DIR: &str = "JOURNAL_SCREENSHOT_DIR";
/// Overrides the asset mode (`path` or `inline`).
pub const ENV_ASSET_MODE: &str = "JOURNAL_ASSET_MODE";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    path = %path.display(),
    database = %config.database.url,
    asset_mode = %config.assets.mode,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Like `load_config`, but a missing file yields the defaults.
///
/// Environment overrides are applied in both cases.
pub fn load_config_or_default(path: &str) -> Result<AppConfig> {
  let mut config = if Path::new(path).exists() {
    load_config(path)?
  } else {
    info!(path, "No config file, using defaults");
    AppConfig::default()
  };

  apply_overrides(&mut config, |key| std::env::var(key).ok())?;
  validate_config(&config)?;
  Ok(config)
}

/// Parse and validate TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Apply `JOURNAL_*` overrides read through `lookup`.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(url) = lookup(ENV_DATABASE_URL) {
    config.database.url = url;
  }
  if let Some(dir) = lookup(ENV_SCREENSHOT_DIR) {
    config.assets.screenshot_dir = dir;
  }
  if let Some(mode) = lookup(ENV_ASSET_MODE) {
    config.assets.mode = mode
      .parse::<AssetMode>()
      .map_err(anyhow::Error::msg)
      .with_context(|| format!("Invalid {ENV_ASSET_MODE}"))?;
  }
  Ok(())
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.database.url.starts_with("sqlite:"),
    "database.url must be a sqlite URL, got {}",
    config.database.url
  );
  anyhow::ensure!(
    config.database.max_connections > 0,
    "database.max_connections must be positive"
  );
  anyhow::ensure!(
    config.database.acquire_timeout_seconds > 0,
    "database.acquire_timeout_seconds must be positive"
  );
  if config.assets.mode == AssetMode::Path {
    anyhow::ensure!(
      !config.assets.screenshot_dir.trim().is_empty(),
      "assets.screenshot_dir must not be empty in path mode"
    );
  }
  Ok(())
}
