use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trailing performance window, measured in trading days back from the latest bar.
///
/// A year is approximated as 252 trading days; no calendar alignment is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "10Y")]
    TenYears,
}

impl Period {
    pub const TRADING_DAYS_PER_YEAR: usize = 252;

    /// Every reported period, shortest first.
    pub const ALL: [Period; 4] = [
        Period::OneYear,
        Period::ThreeYears,
        Period::FiveYears,
        Period::TenYears,
    ];

    pub fn years(&self) -> usize {
        match self {
            Period::OneYear => 1,
            Period::ThreeYears => 3,
            Period::FiveYears => 5,
            Period::TenYears => 10,
        }
    }

    /// The 0-based position in a descending price series that stands in for "N years ago".
    pub fn offset(&self) -> usize {
        self.years() * Self::TRADING_DAYS_PER_YEAR
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneYear => "1Y",
            Period::ThreeYears => "3Y",
            Period::FiveYears => "5Y",
            Period::TenYears => "10Y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownPeriod(s.to_string()))
    }
}

/// How a holding without a price at a period's offset affects that period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingHistoryPolicy {
    /// Any holding missing the offset makes the whole period unavailable.
    #[default]
    Strict,
    /// A missing price contributes nothing to the past aggregate.
    TreatAsZero,
}
