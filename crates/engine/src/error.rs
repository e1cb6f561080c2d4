use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Holdings store error: {0}")]
    HoldingsStore(#[from] database::DbError),

    #[error("Invalid holdings: {0}")]
    InvalidHoldings(String),

    #[error("The valuation run was cancelled before it completed.")]
    Cancelled,
}

/// Why a single holding's price history could not be obtained.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API client error: {0}")]
    ApiClient(#[from] api_client::error::ApiError),

    #[error("Price history request timed out after {0:?}")]
    Timeout(Duration),
}
