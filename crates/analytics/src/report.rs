use core_types::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A three-state result for every per-holding computation.
///
/// `Absent` means the inputs were fine but held no usable data; `Error` means
/// something upstream failed. Neither is ever reported as a zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome<T> {
    Present(T),
    Absent,
    Error(String),
}

impl<T> Outcome<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Outcome::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Outcome::Present(_))
    }
}

/// Symbol → current monetary value. Holdings without a current price have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValuationSnapshot(BTreeMap<String, Decimal>);

impl ValuationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, value: Decimal) {
        self.0.insert(symbol.into(), value);
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.0.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(symbol, value)| (symbol.as_str(), *value))
    }

    /// Net worth: the sum of every entry and nothing else. `None` if the sum
    /// leaves the decimal range.
    pub fn net_worth(&self) -> Option<Decimal> {
        self.0
            .values()
            .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))
    }
}

/// Why a period has no percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// These holdings have no price at the period's offset.
    MissingHistory { symbols: Vec<String> },
    /// The past aggregate was zero, so no ratio exists.
    ZeroBaseline,
    /// The aggregate or ratio left the decimal range.
    Overflow,
}

/// The portfolio's change over one trailing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodPerformance {
    Available {
        /// `(current / past - 1) * 100`.
        change_pct: Decimal,
        past_net_worth: Decimal,
    },
    Unavailable { reason: UnavailableReason },
}

impl PeriodPerformance {
    pub fn change_pct(&self) -> Option<Decimal> {
        match self {
            PeriodPerformance::Available { change_pct, .. } => Some(*change_pct),
            PeriodPerformance::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PeriodPerformance::Available { .. })
    }
}

/// Period → percentage or an explicit unavailable marker. Always holds all four periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceReport(BTreeMap<Period, PeriodPerformance>);

impl PerformanceReport {
    pub fn insert(&mut self, period: Period, performance: PeriodPerformance) {
        self.0.insert(period, performance);
    }

    pub fn get(&self, period: Period) -> Option<&PeriodPerformance> {
        self.0.get(&period)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &PeriodPerformance)> {
        self.0.iter().map(|(period, perf)| (*period, perf))
    }
}

/// The per-holding line of a report, including holdings that could not be valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub symbol: String,
    pub quantity: u64,
    pub value: Outcome<Decimal>,
    /// Number of bars dropped from this holding's series during normalization.
    pub dropped_bars: usize,
    /// Number of usable bars after normalization.
    pub history_len: usize,
}

/// Everything one valuation run produces. Built fresh on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub holdings: Vec<HoldingValuation>,
    pub snapshot: ValuationSnapshot,
    pub net_worth: Decimal,
    pub performance: PerformanceReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn net_worth_sums_snapshot_entries() {
        let mut snapshot = ValuationSnapshot::new();
        snapshot.insert("AAA", dec!(100.50));
        snapshot.insert("BBB", dec!(20));
        assert_eq!(snapshot.net_worth(), Some(dec!(120.50)));
        assert_eq!(ValuationSnapshot::new().net_worth(), Some(Decimal::ZERO));
    }

    #[test]
    fn net_worth_out_of_range_is_none() {
        let mut snapshot = ValuationSnapshot::new();
        snapshot.insert("AAA", Decimal::MAX);
        snapshot.insert("BBB", dec!(1));
        assert_eq!(snapshot.net_worth(), None);
    }

    #[test]
    fn unavailable_period_serializes_without_a_number() {
        let mut report = PerformanceReport::default();
        report.insert(
            Period::OneYear,
            PeriodPerformance::Unavailable {
                reason: UnavailableReason::ZeroBaseline,
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["1Y"]["status"], "unavailable");
        assert_eq!(json["1Y"]["reason"]["kind"], "zero_baseline");
        assert!(json["1Y"].get("change_pct").is_none());
    }

    #[test]
    fn outcome_accessors() {
        let present: Outcome<Decimal> = Outcome::Present(dec!(1));
        assert_eq!(present.present(), Some(&dec!(1)));
        assert!(!Outcome::<Decimal>::Absent.is_present());
        assert_eq!(Outcome::<Decimal>::Error("boom".into()).present(), None);
    }
}
