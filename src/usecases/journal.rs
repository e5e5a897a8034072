//! Journal - Trade Records and Screenshot Lifecycle
//!
//! Orchestrates the two ports:
//! - `TradeStore` keeps the rows
//! - `AssetStore` keeps the screenshot bytes
//!
//! The journal is the only place that mutates both, so it owns the one
//! invariant that spans them: no live trade references a purged asset,
//! and no replaced or deleted screenshot is left behind on disk.
//!
//! Ordering rules:
//! - create: save assets, then insert; on failure purge what was saved
//! - update: save new assets, write the row, then purge superseded ones
//! - delete: purge assets, then remove the row

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::{
  AssetReference, JournalStats, ScreenshotChanges, ScreenshotSlots, ScreenshotUploads,
  SlotChange, Timeframe, Trade, TradeFields, TradeFilter, TradeId, TradePatch,
};
use crate::error::Result;
use crate::ports::{AssetStore, TradeStore};

/// Trade repository with screenshot bookkeeping.
pub struct Journal<S: ?Sized, A: ?Sized> {
  /// Relational row storage.
  store: Arc<S>,
  /// Screenshot storage.
  assets: Arc<A>,
}

impl<S: ?Sized, A: ?Sized> Clone for Journal<S, A> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      assets: Arc::clone(&self.assets),
    }
  }
}

impl<S, A> Journal<S, A>
where
  S: TradeStore + ?Sized,
  A: AssetStore + ?Sized,
{
  /// Create a journal over injected stores.
  pub const fn new(store: Arc<S>, assets: Arc<A>) -> Self {
    Self { store, assets }
  }

  /// Prepare storage: create or extend the schema, then migrate legacy
  /// screenshot lists. Safe to call on every start.
  #[instrument(skip(self))]
  pub async fn ensure_schema(&self) -> Result<()> {
    self.store.ensure_schema().await?;
    let migrated = self.store.migrate_legacy_screenshots().await?;
    info!(legacy_rows_migrated = migrated, "Journal storage ready");
    Ok(())
  }

  /// Record a new trade with its initial screenshots.
  ///
  /// Nothing is written when validation fails. If a screenshot cannot
  /// be saved, or the insert fails, screenshots already saved by this
  /// call are purged and the error is returned.
  #[instrument(skip_all, fields(pair = ?fields.pair, uploads = uploads.len()))]
  pub async fn create(
    &self,
    fields: &TradeFields,
    uploads: &ScreenshotUploads,
  ) -> Result<TradeId> {
    fields.validate()?;

    let mut slots = ScreenshotSlots::empty();
    for (&timeframe, bytes) in uploads {
      if bytes.is_empty() {
        continue;
      }
      match self.assets.save(timeframe, bytes).await {
        Ok(reference) => {
          slots.set(timeframe, Some(reference));
        }
        Err(e) => {
          self.purge_all(slots.references()).await;
          return Err(e);
        }
      }
    }

    match self.store.insert(fields, &slots).await {
      Ok(id) => {
        info!(trade_id = id, screenshots = slots.filled(), "Trade recorded");
        Ok(id)
      }
      Err(e) => {
        self.purge_all(slots.references()).await;
        Err(e)
      }
    }
  }

  /// Trades matching `filter`, newest first.
  pub async fn list(&self, filter: &TradeFilter) -> Result<Vec<Trade>> {
    self.store.list(filter).await
  }

  /// One trade, or `None` if it does not exist.
  pub async fn fetch_by_id(&self, id: TradeId) -> Result<Option<Trade>> {
    self.store.fetch_by_id(id).await
  }

  /// Apply a sparse field patch and per-slot screenshot changes.
  ///
  /// Returns rows affected: 0 for an unknown id or when there is
  /// nothing to write. Superseded screenshots are purged only after
  /// the row no longer references them.
  #[instrument(skip(self, patch, changes))]
  pub async fn update(
    &self,
    id: TradeId,
    patch: &TradePatch,
    changes: &ScreenshotChanges,
  ) -> Result<u64> {
    if changes.is_empty() {
      if patch.is_empty() {
        debug!("Empty update, nothing written");
        return Ok(0);
      }
      return self.store.update(id, patch, None).await;
    }

    let Some(current) = self.store.fetch_by_id(id).await? else {
      debug!("Trade not found, nothing updated");
      return Ok(0);
    };

    let mut slots = current.screenshots;
    let mut saved: Vec<AssetReference> = Vec::new();
    let mut superseded: Vec<(Timeframe, Option<AssetReference>)> = Vec::new();

    for (timeframe, change) in changes.iter() {
      let next = match change {
        SlotChange::Replace(bytes) => match self.assets.save(timeframe, bytes).await {
          Ok(reference) => {
            saved.push(reference.clone());
            Some(reference)
          }
          Err(e) => {
            self.purge_all(saved.iter()).await;
            return Err(e);
          }
        },
        SlotChange::Clear => None,
      };
      let previous = slots.set(timeframe, next);
      superseded.push((timeframe, previous));
    }

    let affected = match self.store.update(id, patch, Some(&slots)).await {
      Ok(affected) => affected,
      Err(e) => {
        self.purge_all(saved.iter()).await;
        return Err(e);
      }
    };

    if affected == 0 {
      warn!("Trade vanished during update, discarding new screenshots");
      self.purge_all(saved.iter()).await;
      return Ok(0);
    }

    for (timeframe, previous) in &superseded {
      self
        .assets
        .reconcile(previous.as_ref(), slots.get(*timeframe))
        .await;
    }

    info!(
      rows = affected,
      screenshots_changed = superseded.len(),
      "Trade updated"
    );
    Ok(affected)
  }

  /// Delete a trade and every screenshot it references.
  ///
  /// Returns rows affected; an unknown id is a no-op returning 0.
  #[instrument(skip(self))]
  pub async fn delete(&self, id: TradeId) -> Result<u64> {
    let Some(current) = self.store.fetch_by_id(id).await? else {
      debug!("Trade not found, nothing deleted");
      return Ok(0);
    };

    self.purge_all(current.screenshots.references()).await;
    let affected = self.store.delete(id).await?;

    info!(rows = affected, "Trade deleted");
    Ok(affected)
  }

  /// Statistics over the trades matching `filter`.
  pub async fn stats(&self, filter: &TradeFilter) -> Result<JournalStats> {
    let trades = self.store.list(filter).await?;
    Ok(JournalStats::from_trades(&trades))
  }

  /// Screenshot bytes for a reference, `None` when unavailable.
  pub async fn load_screenshot(&self, reference: &AssetReference) -> Option<Vec<u8>> {
    self.assets.load(reference).await
  }

  /// Check if the row store is reachable.
  pub async fn is_healthy(&self) -> bool {
    self.store.is_healthy().await
  }

  async fn purge_all<'a>(&self, references: impl Iterator<Item = &'a AssetReference>) {
    for reference in references {
      self.assets.purge(reference).await;
    }
  }
}
