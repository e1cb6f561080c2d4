use crate::error::AnalyticsError;
use crate::report::Outcome;
use crate::series::PriceSeries;
use core_types::Holding;
use rust_decimal::Decimal;

/// Values one holding at its latest close: `quantity * price_at_offset(0)`.
///
/// An empty series yields `Absent` rather than zero so the caller can keep the
/// holding out of the snapshot and net worth.
pub fn valuate(holding: &Holding, series: &PriceSeries) -> Outcome<Decimal> {
    let Some(latest_close) = series.price_at_offset(0) else {
        return Outcome::Absent;
    };

    match holding.quantity_decimal().checked_mul(latest_close) {
        Some(value) => Outcome::Present(value),
        None => Outcome::Error(AnalyticsError::Overflow(holding.symbol.clone()).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::normalize;
    use core_types::RawBar;
    use rust_decimal_macros::dec;

    #[test]
    fn value_is_quantity_times_latest_close() {
        let holding = Holding::new("VTI", 12).unwrap();
        let series = normalize(vec![
            RawBar::with_close("2024-06-03", "250.10"),
            RawBar::with_close("2024-06-04", "251.25"),
        ])
        .series;

        assert_eq!(valuate(&holding, &series), Outcome::Present(dec!(3015.00)));
    }

    #[test]
    fn empty_series_is_absent_not_zero() {
        let holding = Holding::new("GONE", 5).unwrap();
        assert_eq!(valuate(&holding, &PriceSeries::empty()), Outcome::Absent);
    }

    #[test]
    fn overflow_is_an_error_outcome() {
        let holding = Holding::new("BIG", u64::MAX).unwrap();
        let series = normalize(vec![RawBar::with_close(
            "2024-06-03",
            Decimal::MAX.to_string(),
        )])
        .series;

        assert!(matches!(valuate(&holding, &series), Outcome::Error(_)));
    }
}
