//! Persistence Adapters - SQLite Trade Storage
//!
//! Implements the `TradeStore` port on top of an sqlx SQLite pool.
//! The pool is built by the caller and injected, so tests can run the
//! same code against a private in-memory database.

pub mod row;
pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteTradeStore;
