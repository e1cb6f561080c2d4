use crate::assemble::{assemble_report, FetchedHistory};
use crate::error::{EngineError, FetchError};
use analytics::ValuationReport;
use api_client::PriceHistoryProvider;
use configuration::ValuationSettings;
use core_types::{Holding, RawBar};
use database::HoldingsStore;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// The central orchestrator of a valuation run.
///
/// It holds no state between runs: every call to `run` fetches and recomputes
/// everything from scratch.
pub struct PortfolioValuationEngine {
    provider: Arc<dyn PriceHistoryProvider>,
    settings: ValuationSettings,
}

impl PortfolioValuationEngine {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, settings: ValuationSettings) -> Self {
        Self { provider, settings }
    }

    /// Values `holdings` and computes trailing performance.
    ///
    /// Per-holding failures never fail the run; they show up as excluded lines in
    /// the report. The run fails only on invalid input (duplicate symbols, zero quantities).
    pub async fn run(&self, holdings: &[Holding]) -> Result<ValuationReport, EngineError> {
        validate_holdings(holdings)?;

        let fetched = self.fetch_all(holdings).await;
        let report = assemble_report(fetched, self.settings.missing_history);

        info!(
            holdings = holdings.len(),
            valued = report.snapshot.len(),
            net_worth = %report.net_worth,
            "Valuation run complete"
        );
        Ok(report)
    }

    /// Like `run`, but abandons every in-flight fetch and returns `Cancelled` as soon as
    /// `shutdown` resolves. A partial report is never returned.
    pub async fn run_until<F>(
        &self,
        holdings: &[Holding],
        shutdown: F,
    ) -> Result<ValuationReport, EngineError>
    where
        F: Future<Output = ()>,
    {
        until_shutdown(self.run(holdings), shutdown).await
    }

    /// Reads the current holdings from `store` and values them.
    pub async fn run_from_store(
        &self,
        store: &dyn HoldingsStore,
    ) -> Result<ValuationReport, EngineError> {
        let holdings = store.current_holdings().await?;
        self.run(&holdings).await
    }

    /// `run_from_store` with the same cancellation contract as `run_until`.
    pub async fn run_from_store_until<F>(
        &self,
        store: &dyn HoldingsStore,
        shutdown: F,
    ) -> Result<ValuationReport, EngineError>
    where
        F: Future<Output = ()>,
    {
        until_shutdown(self.run_from_store(store), shutdown).await
    }

    /// Fetches every holding's history with at most `max_concurrent_fetches` in flight,
    /// settling all of them before returning. Results keep the input order.
    async fn fetch_all(&self, holdings: &[Holding]) -> Vec<FetchedHistory> {
        let limit = self.settings.max_concurrent_fetches.max(1);

        stream::iter(holdings.iter().cloned())
            .map(|holding| async move {
                let result = self.fetch_with_retry(&holding.symbol).await;
                FetchedHistory { holding, result }
            })
            .buffered(limit)
            .collect()
            .await
    }

    /// One attempt plus at most one retry, each bounded by the fetch timeout.
    async fn fetch_with_retry(&self, symbol: &str) -> Result<Vec<RawBar>, FetchError> {
        let timeout = self.settings.fetch_timeout();
        let max_attempts = self.settings.max_retries.min(1) + 1;
        let mut attempt = 1;

        loop {
            let error = match tokio::time::timeout(
                timeout,
                self.provider.fetch_daily_history(symbol),
            )
            .await
            {
                Ok(Ok(bars)) => return Ok(bars),
                Ok(Err(e)) => FetchError::from(e),
                Err(_) => FetchError::Timeout(timeout),
            };

            warn!(symbol, attempt, max_attempts, error = %error, "Price history fetch failed");
            if attempt >= max_attempts {
                return Err(error);
            }
            attempt += 1;
        }
    }
}

async fn until_shutdown<R, F>(run: R, shutdown: F) -> Result<ValuationReport, EngineError>
where
    R: Future<Output = Result<ValuationReport, EngineError>>,
    F: Future<Output = ()>,
{
    tokio::select! {
        report = run => report,
        _ = shutdown => {
            warn!("Valuation run cancelled; discarding in-flight fetches");
            Err(EngineError::Cancelled)
        }
    }
}

/// Symbols must be unique and quantities positive for the snapshot to be well defined.
fn validate_holdings(holdings: &[Holding]) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(holdings.len());
    for holding in holdings {
        if holding.symbol.trim().is_empty() {
            return Err(EngineError::InvalidHoldings(
                "holding with an empty symbol".to_string(),
            ));
        }
        if holding.quantity == 0 {
            return Err(EngineError::InvalidHoldings(format!(
                "{} has a quantity of zero",
                holding.symbol
            )));
        }
        if !seen.insert(holding.symbol.as_str()) {
            return Err(EngineError::InvalidHoldings(format!(
                "{} appears more than once",
                holding.symbol
            )));
        }
    }
    Ok(())
}
