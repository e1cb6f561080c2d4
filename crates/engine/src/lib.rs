//! # Portfolio Valuation Engine
//!
//! Orchestrates one valuation run: fetch every holding's daily history
//! concurrently, then hand the collected series to the pure calculators in
//! `analytics` and assemble a single `ValuationReport`.

pub mod assemble;
pub mod error;
pub mod valuation;

pub use assemble::{assemble_report, FetchedHistory};
pub use error::{EngineError, FetchError};
pub use valuation::PortfolioValuationEngine;
