use crate::report::{PerformanceReport, PeriodPerformance, UnavailableReason};
use crate::series::PriceSeries;
use core_types::{Holding, MissingHistoryPolicy, Period};
use rust_decimal::Decimal;
use tracing::debug;

/// A holding paired with its normalized history.
///
/// Holdings whose fetch failed are still passed in, with an empty series, so that
/// they count as missing for every period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionHistory {
    pub holding: Holding,
    pub series: PriceSeries,
}

impl PositionHistory {
    pub fn new(holding: Holding, series: PriceSeries) -> Self {
        Self { holding, series }
    }
}

/// A stateless calculator for the portfolio's trailing 1Y/3Y/5Y/10Y performance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingPerformanceCalculator {
    policy: MissingHistoryPolicy,
}

impl TrailingPerformanceCalculator {
    pub fn new(policy: MissingHistoryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingHistoryPolicy {
        self.policy
    }

    /// Computes every period against `current_net_worth`, the sum of the offset-0 valuations.
    pub fn calculate(
        &self,
        positions: &[PositionHistory],
        current_net_worth: Decimal,
    ) -> PerformanceReport {
        let mut report = PerformanceReport::default();
        for period in Period::ALL {
            let performance = self.period_performance(period, positions, current_net_worth);
            if let PeriodPerformance::Unavailable { reason } = &performance {
                debug!(period = %period, ?reason, "Trailing performance unavailable");
            }
            report.insert(period, performance);
        }
        report
    }

    fn period_performance(
        &self,
        period: Period,
        positions: &[PositionHistory],
        current_net_worth: Decimal,
    ) -> PeriodPerformance {
        let offset = period.offset();
        let mut past_net_worth = Decimal::ZERO;
        let mut missing = Vec::new();

        for position in positions {
            let Some(price) = position.series.price_at_offset(offset) else {
                missing.push(position.holding.symbol.clone());
                continue;
            };
            let Some(total) = position
                .holding
                .quantity_decimal()
                .checked_mul(price)
                .and_then(|past_value| past_net_worth.checked_add(past_value))
            else {
                return unavailable(UnavailableReason::Overflow);
            };
            past_net_worth = total;
        }

        if !missing.is_empty() && self.policy == MissingHistoryPolicy::Strict {
            return unavailable(UnavailableReason::MissingHistory { symbols: missing });
        }

        if past_net_worth.is_zero() {
            return unavailable(UnavailableReason::ZeroBaseline);
        }

        let change_pct = current_net_worth
            .checked_div(past_net_worth)
            .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
            .and_then(|delta| delta.checked_mul(Decimal::ONE_HUNDRED));

        match change_pct {
            Some(change_pct) => PeriodPerformance::Available {
                change_pct,
                past_net_worth,
            },
            None => unavailable(UnavailableReason::Overflow),
        }
    }
}

fn unavailable(reason: UnavailableReason) -> PeriodPerformance {
    PeriodPerformance::Unavailable { reason }
}
