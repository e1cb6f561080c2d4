use crate::error::ConfigError;
use core_types::MissingHistoryPolicy;
use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; omitted values fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub valuation: ValuationSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.search_result_limit == 0 {
            return Err(ConfigError::ValidationError(
                "api.search_result_limit must be at least 1".to_string(),
            ));
        }
        if self.valuation.max_concurrent_fetches == 0 {
            return Err(ConfigError::ValidationError(
                "valuation.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.valuation.fetch_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "valuation.fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.valuation.max_retries > 1 {
            return Err(ConfigError::ValidationError(format!(
                "valuation.max_retries allows at most one retry, got {}",
                self.valuation.max_retries
            )));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection details for the Alpha Vantage price and search API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Usually left out of the file and supplied through `ALPHA_VANTAGE_API_KEY`.
    pub api_key: Option<String>,
    /// How many symbol-search matches to keep.
    pub search_result_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: None,
            search_result_limit: 5,
        }
    }
}

/// Parameters for a valuation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValuationSettings {
    /// Upper bound on price-history requests in flight at once.
    pub max_concurrent_fetches: usize,
    pub fetch_timeout_secs: u64,
    /// Retries after a failed or timed-out fetch. At most one.
    pub max_retries: u32,
    pub missing_history: MissingHistoryPolicy,
}

impl ValuationSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            fetch_timeout_secs: 30,
            max_retries: 1,
            missing_history: MissingHistoryPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://holdings.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for the daily-rolling log file.
    pub directory: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
        }
    }
}
