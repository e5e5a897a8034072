//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (SQLite via sqlx, local files). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `assets`: Screenshot storage on disk or inline in the row
//! - `persistence`: Trade rows and schema management in SQLite

pub mod assets;
pub mod persistence;
