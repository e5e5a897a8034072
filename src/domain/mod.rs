//! Domain layer - Journal entities and pure logic.
//!
//! Trades, screenshot slots, asset references and statistics. Nothing
//! here touches the database or the filesystem; the ports and adapters
//! do that.

pub mod asset;
pub mod screenshots;
pub mod stats;
pub mod trade;

pub use asset::AssetReference;
pub use screenshots::{
    ScreenshotChanges, ScreenshotSlots, ScreenshotUploads, SlotChange, Timeframe,
};
pub use stats::JournalStats;
pub use trade::{
    Session, Trade, TradeFields, TradeFilter, TradeId, TradePatch, TradeType,
};
