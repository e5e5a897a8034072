//! Trade Journal - Entry Point
//!
//! Prepares journal storage and reports its state. The presentation
//! layer embeds the library; this binary is what deployments run on
//! start-up and what you run by hand to migrate an old database.
//!
//! Wiring sequence:
//! 1. Load config.toml (or defaults) + `JOURNAL_*` overrides
//! 2. Init tracing (JSON structured logging)
//! 3. Open the SQLite pool (TradeStore port)
//! 4. Create the screenshot store for the configured mode (AssetStore port)
//! 5. Ensure schema + migrate legacy screenshot lists
//! 6. Log journal statistics

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use trade_journal::adapters::assets::{FsAssetStore, InlineAssetStore};
use trade_journal::adapters::persistence::SqliteTradeStore;
use trade_journal::config::{self, AssetMode};
use trade_journal::domain::TradeFilter;
use trade_journal::ports::AssetStore;
use trade_journal::usecases::Journal;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config_or_default(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.journal.log_level)
            }),
        )
        .json()
        .init();

    info!(
        name = %config.journal.name,
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database.url,
        asset_mode = %config.assets.mode,
        "Starting trade journal"
    );

    // ── 3. Relational store ─────────────────────────────────
    ensure_parent_dir(&config.database.url).await?;
    let store = SqliteTradeStore::connect(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_seconds),
    )
    .await
    .context("Failed to open trade database")?;

    // ── 4. Screenshot store ─────────────────────────────────
    let assets: Arc<dyn AssetStore> = match config.assets.mode {
        AssetMode::Path => Arc::new(
            FsAssetStore::new(&config.assets.screenshot_dir)
                .await
                .context("Failed to create screenshot directory")?,
        ),
        AssetMode::Inline => Arc::new(InlineAssetStore::new()),
    };

    let journal = Journal::new(Arc::new(store), assets);

    // ── 5. Schema ───────────────────────────────────────────
    journal
        .ensure_schema()
        .await
        .context("Failed to prepare trade schema")?;

    if !journal.is_healthy().await {
        warn!("Trade store did not answer health check");
    }

    // ── 6. Report ───────────────────────────────────────────
    let stats = journal
        .stats(&TradeFilter::default())
        .await
        .context("Failed to read trades")?;

    info!(
        total = stats.total,
        wins = stats.wins,
        losses = stats.losses,
        breakeven = stats.breakeven,
        win_rate = stats.win_rate,
        average_rr = stats.average_rr,
        total_profit_percent = stats.total_profit_percent,
        "Journal ready"
    );

    Ok(())
}

/// Create the directory holding a file-backed SQLite database.
async fn ensure_parent_dir(url: &str) -> Result<()> {
    let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
