//! Trade Store Port - Relational Row Persistence Interface
//!
//! Defines the trait the journal use case needs from the relational
//! store: schema management plus row-level CRUD. The store knows
//! nothing about screenshot bytes; it only persists the serialized
//! slot map it is handed.

use async_trait::async_trait;

use crate::domain::{ScreenshotSlots, Trade, TradeFields, TradeFilter, TradeId, TradePatch};
use crate::error::Result;

/// Trait for trade row storage providers.
///
/// Absence is reported through `Option` or a zero row count, never
/// as an error. Engine failures surface as `JournalError::Storage`.
#[async_trait]
pub trait TradeStore: Send + Sync + 'static {
  /// Create the trades table and add any columns missing from an
  /// older revision. Additive only.
  async fn ensure_schema(&self) -> Result<()>;

  /// Rewrite legacy positional screenshot lists into the map form.
  /// Returns the number of rows rewritten.
  async fn migrate_legacy_screenshots(&self) -> Result<u64>;

  /// Insert one row and return its new identifier.
  async fn insert(&self, fields: &TradeFields, screenshots: &ScreenshotSlots)
    -> Result<TradeId>;

  /// All trades matching `filter`, newest date first, then newest
  /// insertion first.
  async fn list(&self, filter: &TradeFilter) -> Result<Vec<Trade>>;

  /// Single trade by identifier.
  async fn fetch_by_id(&self, id: TradeId) -> Result<Option<Trade>>;

  /// Write the fields present in `patch` and, when given, the full
  /// slot map. Returns rows affected (0 for an unknown id or an empty
  /// change set).
  async fn update(
    &self,
    id: TradeId,
    patch: &TradePatch,
    screenshots: Option<&ScreenshotSlots>,
  ) -> Result<u64>;

  /// Remove one row. Returns rows affected.
  async fn delete(&self, id: TradeId) -> Result<u64>;

  /// Check if the store answers queries.
  async fn is_healthy(&self) -> bool;
}
