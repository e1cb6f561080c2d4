//! # Holdings Database Crate
//!
//! This crate is the application's store of owned holdings: one row per symbol
//! with its quantity and descriptive metadata.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** This crate encapsulates all database-specific logic behind
//!   the `HoldingsStore` trait. The valuation engine only ever sees `Holding`s.
//! - **Asynchronous & Pooled:** All operations are asynchronous and go through a
//!   `SqlitePool`.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: open the pool and bring the schema up to date.
//! - `HoldingsStore`: the create/list/update/delete contract.
//! - `DbRepository`: the SQLite implementation of `HoldingsStore`.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbHolding, DbRepository, HoldingDetails, HoldingsStore};
