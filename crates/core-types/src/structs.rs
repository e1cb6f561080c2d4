use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A position the user owns: a ticker symbol and a whole number of units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: u64,
}

impl Holding {
    /// Creates a validated holding. The symbol is trimmed and upper-cased.
    pub fn new(symbol: &str, quantity: u64) -> Result<Self, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "must not be empty".to_string(),
            ));
        }
        if quantity == 0 {
            return Err(CoreError::InvalidInput(
                "quantity".to_string(),
                format!("must be greater than zero for {}", symbol),
            ));
        }
        Ok(Self { symbol, quantity })
    }

    pub fn quantity_decimal(&self) -> Decimal {
        Decimal::from(self.quantity)
    }
}

/// One daily bar exactly as the price provider delivered it.
///
/// Every numeric field is kept as text; parsing happens during normalization
/// so that one bad field drops one bar instead of failing the whole series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawBar {
    pub date: String,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
}

impl RawBar {
    /// Convenience constructor for a bar that only carries a close price.
    pub fn with_close(date: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            close: Some(close.into()),
            ..Default::default()
        }
    }
}

/// A parsed daily bar. Only `close` feeds the valuation; the rest is carried along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Decimal,
    pub volume: Option<Decimal>,
}
