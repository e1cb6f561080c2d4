use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{PriceBar, RawBar};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One asset's daily bars, ordered from the most recent trading day to the oldest.
///
/// The ordering is established by [`normalize`] and is the only way to build a
/// non-empty series, so position 0 is always the latest close.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// A series with no bars, used for holdings whose history could not be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    /// The close `offset` trading days back from the latest bar, if the series reaches that far.
    pub fn price_at_offset(&self, offset: usize) -> Option<Decimal> {
        self.bars.get(offset).map(|bar| bar.close)
    }
}

/// The result of normalizing a raw series: the usable bars plus every bar that was dropped.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSeries {
    pub series: PriceSeries,
    pub rejected: Vec<AnalyticsError>,
}

/// Parses, de-duplicates and sorts a provider series into descending date order.
///
/// A bar is rejected (and reported in `rejected`) when its date is not `YYYY-MM-DD`,
/// its close is missing, unparseable or negative, or its date repeats an earlier bar.
/// Rejected bars are dropped; they never stand in as a zero price.
pub fn normalize(raw: Vec<RawBar>) -> NormalizedSeries {
    let mut rejected = Vec::new();
    let mut bars: Vec<PriceBar> = raw
        .into_iter()
        .filter_map(|bar| match parse_bar(&bar) {
            Ok(parsed) => Some(parsed),
            Err(reason) => {
                rejected.push(AnalyticsError::MalformedSeries {
                    date: bar.date,
                    reason,
                });
                None
            }
        })
        .collect();

    // Stable sort, so the first-delivered bar wins on duplicate dates.
    bars.sort_by(|a, b| b.date.cmp(&a.date));

    let mut unique: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if unique.last().is_some_and(|prev| prev.date == bar.date) {
            rejected.push(AnalyticsError::MalformedSeries {
                date: bar.date.format(DATE_FORMAT).to_string(),
                reason: "duplicate trading day".to_string(),
            });
            continue;
        }
        unique.push(bar);
    }

    NormalizedSeries {
        series: PriceSeries { bars: unique },
        rejected,
    }
}

fn parse_bar(raw: &RawBar) -> Result<PriceBar, String> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), DATE_FORMAT)
        .map_err(|e| format!("invalid date: {}", e))?;

    let close_text = raw
        .close
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing close price".to_string())?;
    let close = Decimal::from_str(close_text)
        .map_err(|e| format!("unparseable close '{}': {}", close_text, e))?;
    if close.is_sign_negative() && !close.is_zero() {
        return Err(format!("negative close {}", close));
    }

    Ok(PriceBar {
        date,
        open: parse_optional(raw.open.as_deref()),
        high: parse_optional(raw.high.as_deref()),
        low: parse_optional(raw.low.as_deref()),
        close,
        volume: parse_optional(raw.volume.as_deref()),
    })
}

/// The carried OHLV fields are informational; a bad value just becomes `None`.
fn parse_optional(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|v| Decimal::from_str(v.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn day(offset: i64) -> String {
        let latest = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        (latest - Duration::days(offset)).format(DATE_FORMAT).to_string()
    }

    fn descending(closes: &[&str]) -> Vec<RawBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| RawBar::with_close(day(i as i64), *close))
            .collect()
    }

    #[test]
    fn ascending_and_descending_inputs_index_identically() {
        let desc = descending(&["103", "102", "101", "100"]);
        let mut asc = desc.clone();
        asc.reverse();

        let from_desc = normalize(desc).series;
        let from_asc = normalize(asc).series;

        assert_eq!(from_desc, from_asc);
        assert_eq!(from_asc.price_at_offset(0), Some(dec!(103)));
        assert_eq!(from_asc.price_at_offset(3), Some(dec!(100)));
    }

    #[test]
    fn shuffled_input_is_sorted_latest_first() {
        let mut raw = descending(&["5", "4", "3", "2", "1"]);
        raw.swap(0, 3);
        raw.swap(1, 4);

        let series = normalize(raw).series;
        let closes: Vec<Decimal> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(5), dec!(4), dec!(3), dec!(2), dec!(1)]);
        assert!(series.bars().windows(2).all(|w| w[0].date > w[1].date));
    }

    #[test]
    fn offset_past_the_end_is_absent() {
        let series = normalize(descending(&["10", "9", "8"])).series;
        assert_eq!(series.price_at_offset(2), Some(dec!(8)));
        assert_eq!(series.price_at_offset(3), None);
        assert_eq!(PriceSeries::empty().price_at_offset(0), None);
    }

    #[test]
    fn malformed_bars_are_dropped_not_zeroed() {
        let mut raw = descending(&["10", "oops", "8", "-1", "6"]);
        raw.push(RawBar {
            date: day(10),
            close: None,
            ..Default::default()
        });
        raw.push(RawBar::with_close("last tuesday", "7"));

        let normalized = normalize(raw);
        let closes: Vec<Decimal> = normalized.series.bars().iter().map(|b| b.close).collect();

        assert_eq!(closes, vec![dec!(10), dec!(8), dec!(6)]);
        assert_eq!(normalized.rejected.len(), 4);
        assert!(normalized
            .rejected
            .iter()
            .all(|e| matches!(e, AnalyticsError::MalformedSeries { .. })));
    }

    #[test]
    fn zero_close_is_kept() {
        let series = normalize(descending(&["0", "1"])).series;
        assert_eq!(series.price_at_offset(0), Some(Decimal::ZERO));
    }

    #[test]
    fn duplicate_dates_keep_the_first_delivered_bar() {
        let raw = vec![
            RawBar::with_close("2024-03-01", "11"),
            RawBar::with_close("2024-03-01", "99"),
            RawBar::with_close("2024-02-29", "10"),
        ];

        let normalized = normalize(raw);
        assert_eq!(normalized.series.len(), 2);
        assert_eq!(normalized.series.price_at_offset(0), Some(dec!(11)));
        assert_eq!(normalized.rejected.len(), 1);
    }

    #[test]
    fn carried_fields_parse_leniently() {
        let raw = vec![RawBar {
            date: "2024-01-02".to_string(),
            open: Some("1.5".to_string()),
            high: Some("n/a".to_string()),
            low: None,
            close: Some(" 2.25 ".to_string()),
            volume: Some("1000".to_string()),
        }];

        let series = normalize(raw).series;
        let bar = series.latest().unwrap();
        assert_eq!(bar.open, Some(dec!(1.5)));
        assert_eq!(bar.high, None);
        assert_eq!(bar.close, dec!(2.25));
        assert_eq!(bar.volume, Some(dec!(1000)));
    }
}
