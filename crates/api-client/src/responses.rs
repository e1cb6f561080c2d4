use crate::error::ApiError;
use core_types::RawBar;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

// Alpha Vantage names its fields with numbered prefixes ("4. close"), so every
// field carries an explicit `#[serde(rename)]`.

/// The body of a `TIME_SERIES_DAILY` request.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesDailyResponse {
    #[serde(rename = "Meta Data")]
    pub meta_data: Option<MetaData>,
    /// Date label → bar. JSON object order is not trusted.
    #[serde(rename = "Time Series (Daily)")]
    pub time_series_daily: HashMap<String, DailyData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaData {
    #[serde(rename = "2. Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "3. Last Refreshed")]
    pub last_refreshed: Option<String>,
}

/// One daily bar. Numbers may arrive as strings or JSON numbers; anything else becomes `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyData {
    #[serde(rename = "1. open", default, deserialize_with = "text_or_number")]
    pub open: Option<String>,
    #[serde(rename = "2. high", default, deserialize_with = "text_or_number")]
    pub high: Option<String>,
    #[serde(rename = "3. low", default, deserialize_with = "text_or_number")]
    pub low: Option<String>,
    #[serde(rename = "4. close", default, deserialize_with = "text_or_number")]
    pub close: Option<String>,
    #[serde(rename = "5. volume", default, deserialize_with = "text_or_number")]
    pub volume: Option<String>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

impl TimeSeriesDailyResponse {
    pub fn into_raw_bars(self) -> Vec<RawBar> {
        self.time_series_daily
            .into_iter()
            .map(|(date, data)| RawBar {
                date,
                open: data.open,
                high: data.high,
                low: data.low,
                close: data.close,
                volume: data.volume,
            })
            .collect()
    }
}

/// The body of a `SYMBOL_SEARCH` request.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    pub best_matches: Vec<BestMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BestMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "2. name")]
    pub name: Option<String>,
    #[serde(rename = "3. type")]
    pub asset_type: Option<String>,
    #[serde(rename = "4. region")]
    pub region: Option<String>,
    #[serde(rename = "8. currency")]
    pub currency: Option<String>,
    #[serde(rename = "9. matchScore")]
    pub match_score: Option<String>,
}

/// A cleaned-up symbol search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub region: Option<String>,
    pub currency: Option<String>,
    pub match_score: Option<Decimal>,
}

/// Parses a daily time-series body into unsorted raw bars.
pub fn parse_time_series(body: &str) -> Result<Vec<RawBar>, ApiError> {
    let value = parse_json(body)?;
    check_provider_error(&value, "Time Series (Daily)")?;
    let response: TimeSeriesDailyResponse =
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    Ok(response.into_raw_bars())
}

/// Parses a symbol search body, keeping at most `limit` matches that carry a symbol.
pub fn parse_symbol_search(body: &str, limit: usize) -> Result<Vec<SymbolMatch>, ApiError> {
    let value = parse_json(body)?;
    check_provider_error(&value, "bestMatches")?;
    let response: SymbolSearchResponse =
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    Ok(response
        .best_matches
        .into_iter()
        .filter_map(|m| {
            let symbol = m.symbol.filter(|s| !s.trim().is_empty())?;
            Some(SymbolMatch {
                symbol,
                name: m.name,
                asset_type: m.asset_type,
                region: m.region,
                currency: m.currency,
                match_score: m.match_score.and_then(|s| Decimal::from_str(&s).ok()),
            })
        })
        .take(limit)
        .collect())
}

fn parse_json(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Alpha Vantage answers failures and rate limits with HTTP 200 and a message field.
fn check_provider_error(value: &Value, payload_key: &str) -> Result<(), ApiError> {
    if value.get(payload_key).is_some() {
        return Ok(());
    }
    for key in ["Error Message", "Note", "Information"] {
        if let Some(message) = value.get(key).and_then(Value::as_str) {
            return Err(ApiError::Provider(message.to_string()));
        }
    }
    Ok(())
}
