//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! journal's workflows.
//!
//! Use cases:
//! - `Journal`: Trade CRUD with screenshot lifecycle and statistics

pub mod journal;

pub use journal::Journal;
