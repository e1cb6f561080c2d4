//! # Portfolio Analytics
//!
//! Pure valuation and trailing-performance calculations over per-asset daily
//! price histories.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every component takes immutable inputs and returns a new
//!   result. Nothing is retained between calls, so a valuation run is trivially repeatable.
//! - **Explicit Absence:** Missing data is never folded into a numeric zero. Per-holding values
//!   are an [`Outcome`], per-period results a [`PeriodPerformance`].
//!
//! ## Public API
//!
//! - `normalize` / `PriceSeries`: descending-ordered series with offset lookup.
//! - `valuate`: the current value of a single holding.
//! - `TrailingPerformanceCalculator`: 1Y/3Y/5Y/10Y percentage change of the whole portfolio.
//! - `ValuationReport` and friends: the data handed to the presentation layer.

// Declare the modules that constitute this crate.
pub mod error;
pub mod performance;
pub mod report;
pub mod series;
pub mod valuator;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use performance::{PositionHistory, TrailingPerformanceCalculator};
pub use report::{
    HoldingValuation, Outcome, PerformanceReport, PeriodPerformance, UnavailableReason,
    ValuationReport, ValuationSnapshot,
};
pub use series::{normalize, NormalizedSeries, PriceSeries};
pub use valuator::valuate;
