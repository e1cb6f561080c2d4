use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ApiConfig;
use core_types::RawBar;
use std::env;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{parse_symbol_search, parse_time_series, SymbolMatch};

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// The source of daily price histories consumed by the valuation engine.
/// This trait is the contract the engine uses, allowing the underlying
/// implementation (live or mock) to be swapped out.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetches the fullest available daily history for `symbol`, in whatever order
    /// the provider returns it.
    async fn fetch_daily_history(&self, symbol: &str) -> Result<Vec<RawBar>, ApiError>;
}

/// Ticker lookup by free-text keywords.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>, ApiError>;
}

/// A concrete client for the Alpha Vantage REST API.
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    search_result_limit: usize,
}

impl AlphaVantageClient {
    /// Builds a client from the `[api]` settings, falling back to `ALPHA_VANTAGE_API_KEY`.
    pub fn new(api_config: &ApiConfig) -> Result<Self, ApiError> {
        let api_key = api_config
            .api_key
            .clone()
            .or_else(|| env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or(ApiError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: api_config.base_url.trim_end_matches('/').to_string(),
            api_key,
            search_result_limit: api_config.search_result_limit,
        })
    }

    /// Issues `GET {base_url}/query` with the given parameters plus the API key.
    async fn query(&self, params: &[(&str, &str)]) -> Result<String, ApiError> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceHistoryProvider for AlphaVantageClient {
    async fn fetch_daily_history(&self, symbol: &str) -> Result<Vec<RawBar>, ApiError> {
        let body = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
            ])
            .await?;

        let bars = parse_time_series(&body)?;
        tracing::debug!(symbol, bars = bars.len(), "Fetched daily history");
        Ok(bars)
    }
}

#[async_trait]
impl SymbolSearch for AlphaVantageClient {
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>, ApiError> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .query(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])
            .await?;

        let matches = parse_symbol_search(&body, self.search_result_limit)?;
        for m in &matches {
            tracing::debug!(symbol = %m.symbol, name = ?m.name, "Search result");
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            api_key: key.map(str::to_string),
            search_result_limit: 5,
        }
    }

    #[test]
    fn configured_key_is_used_and_base_url_trimmed() {
        let client = AlphaVantageClient::new(&config_with_key(Some("demo"))).unwrap();
        assert_eq!(client.api_key, "demo");
        assert_eq!(client.base_url, "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn blank_search_does_not_hit_the_network() {
        // Nothing listens on the discard port, so a real request would fail.
        let client = AlphaVantageClient::new(&config_with_key(Some("demo"))).unwrap();
        assert!(client.search_symbols("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_provider_is_an_http_error() {
        let client = AlphaVantageClient::new(&config_with_key(Some("demo"))).unwrap();
        let result = client.fetch_daily_history("IBM").await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
