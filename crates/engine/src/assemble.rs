use crate::error::FetchError;
use analytics::{
    normalize, valuate, AnalyticsError, HoldingValuation, NormalizedSeries, Outcome, PositionHistory,
    PriceSeries, TrailingPerformanceCalculator, ValuationReport, ValuationSnapshot,
};
use core_types::{Holding, MissingHistoryPolicy, RawBar};
use rust_decimal::Decimal;
use tracing::warn;

/// One holding's settled fetch, successful or not.
#[derive(Debug)]
pub struct FetchedHistory {
    pub holding: Holding,
    pub result: Result<Vec<RawBar>, FetchError>,
}

/// Reduces the settled fetches of a run into its report. Pure apart from logging.
///
/// Holdings that failed to fetch or have no current price stay out of the snapshot
/// and net worth, but are still handed to the performance calculator with whatever
/// history they have, so the missing-history policy decides their effect.
pub fn assemble_report(
    fetched: Vec<FetchedHistory>,
    policy: MissingHistoryPolicy,
) -> ValuationReport {
    let mut lines = Vec::with_capacity(fetched.len());
    let mut positions = Vec::with_capacity(fetched.len());
    let mut snapshot = ValuationSnapshot::new();
    let mut net_worth = Decimal::ZERO;

    for FetchedHistory { holding, result } in fetched {
        let (series, dropped_bars, mut value) = match result {
            Ok(raw) => {
                let NormalizedSeries { series, rejected } = normalize(raw);
                for issue in &rejected {
                    warn!(symbol = %holding.symbol, %issue, "Dropped bar from price series");
                }
                let value = valuate(&holding, &series);
                (series, rejected.len(), value)
            }
            Err(e) => (PriceSeries::empty(), 0, Outcome::Error(e.to_string())),
        };

        // A value that would push net worth out of range is excluded like any
        // other per-holding failure, so net worth stays the snapshot sum.
        if let Outcome::Present(amount) = value {
            match net_worth.checked_add(amount) {
                Some(total) => net_worth = total,
                None => {
                    value = Outcome::Error(
                        AnalyticsError::Overflow(format!("net worth with {}", holding.symbol))
                            .to_string(),
                    );
                }
            }
        }

        match &value {
            Outcome::Present(amount) => snapshot.insert(holding.symbol.clone(), *amount),
            Outcome::Absent => {
                let issue = AnalyticsError::NoCurrentPrice(holding.symbol.clone());
                warn!(symbol = %holding.symbol, %issue, "Holding excluded from valuation");
            }
            Outcome::Error(reason) => {
                warn!(symbol = %holding.symbol, %reason, "Holding excluded from valuation");
            }
        }

        lines.push(HoldingValuation {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            value,
            dropped_bars,
            history_len: series.len(),
        });
        positions.push(PositionHistory::new(holding, series));
    }

    let performance = TrailingPerformanceCalculator::new(policy).calculate(&positions, net_worth);

    ValuationReport {
        holdings: lines,
        snapshot,
        net_worth,
        performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::PeriodPerformance;
    use api_client::error::ApiError;
    use core_types::Period;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn bars(closes: &[&str]) -> Vec<RawBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| RawBar::with_close(format!("2024-01-{:02}", 28 - i), *close))
            .collect()
    }

    #[test]
    fn net_worth_is_exactly_the_snapshot_sum() {
        let fetched = vec![
            FetchedHistory {
                holding: Holding::new("A", 2).unwrap(),
                result: Ok(bars(&["10.5", "10"])),
            },
            FetchedHistory {
                holding: Holding::new("B", 3).unwrap(),
                result: Ok(bars(&["4", "bad", "3"])),
            },
            FetchedHistory {
                holding: Holding::new("C", 1).unwrap(),
                result: Ok(Vec::new()),
            },
            FetchedHistory {
                holding: Holding::new("D", 1).unwrap(),
                result: Err(FetchError::Timeout(Duration::from_secs(1))),
            },
        ];

        let report = assemble_report(fetched, MissingHistoryPolicy::Strict);

        assert_eq!(report.snapshot.get("A"), Some(dec!(21.0)));
        assert_eq!(report.snapshot.get("B"), Some(dec!(12)));
        assert_eq!(report.snapshot.get("C"), None);
        assert_eq!(report.snapshot.get("D"), None);
        assert_eq!(report.net_worth, dec!(33.0));
        assert_eq!(Some(report.net_worth), report.snapshot.net_worth());

        assert_eq!(report.holdings[1].dropped_bars, 1);
        assert_eq!(report.holdings[2].value, Outcome::Absent);
        assert!(matches!(report.holdings[3].value, Outcome::Error(_)));
    }

    #[test]
    fn holding_that_overflows_net_worth_is_excluded() {
        let huge = "50000000000000000000000000000";
        let fetched = vec![
            FetchedHistory {
                holding: Holding::new("BIG1", 1).unwrap(),
                result: Ok(bars(&[huge])),
            },
            FetchedHistory {
                holding: Holding::new("BIG2", 1).unwrap(),
                result: Ok(bars(&[huge])),
            },
            FetchedHistory {
                holding: Holding::new("SMALL", 2).unwrap(),
                result: Ok(bars(&["3"])),
            },
        ];

        let report = assemble_report(fetched, MissingHistoryPolicy::Strict);

        assert!(report.holdings[0].value.is_present());
        match &report.holdings[1].value {
            Outcome::Error(reason) => assert!(reason.contains("BIG2")),
            other => panic!("expected overflow error, got {:?}", other),
        }
        assert!(report.holdings[2].value.is_present());
        assert_eq!(report.snapshot.get("BIG2"), None);
        assert_eq!(report.snapshot.len(), 2);
        assert_eq!(Some(report.net_worth), report.snapshot.net_worth());
        assert_eq!(
            report.net_worth,
            Decimal::from_str_exact(huge).unwrap() + dec!(6)
        );
    }

    #[test]
    fn fetch_error_message_is_kept_on_the_line() {
        let fetched = vec![FetchedHistory {
            holding: Holding::new("ERR", 1).unwrap(),
            result: Err(FetchError::ApiClient(ApiError::Provider("rate limited".into()))),
        }];

        let report = assemble_report(fetched, MissingHistoryPolicy::Strict);

        match &report.holdings[0].value {
            Outcome::Error(reason) => assert!(reason.contains("rate limited")),
            other => panic!("expected error outcome, got {:?}", other),
        }
        assert!(report.snapshot.is_empty());
        assert!(matches!(
            report.performance.get(Period::OneYear),
            Some(PeriodPerformance::Unavailable { .. })
        ));
    }
}
