//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the journal use case requires
//! from the outside world. Adapters implement these traits; tests swap
//! in mocks.
//!
//! Port categories:
//! - `TradeStore`: Relational trade rows and schema
//! - `AssetStore`: Screenshot blobs addressed by `AssetReference`

pub mod asset_store;
pub mod repository;

pub use asset_store::AssetStore;
pub use repository::TradeStore;
