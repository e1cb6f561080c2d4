use analytics::{Outcome, PeriodPerformance, UnavailableReason, ValuationReport};
use api_client::SymbolMatch;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use database::DbHolding;
use rust_decimal::Decimal;

/// Shown wherever a number is missing. Missing data is never printed as zero.
const UNAVAILABLE: &str = "unavailable";

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn right(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

pub fn format_money(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

pub fn format_change(performance: Option<&PeriodPerformance>) -> String {
    match performance {
        Some(PeriodPerformance::Available { change_pct, .. }) => {
            let sign = if change_pct.is_sign_negative() { "" } else { "+" };
            format!("{}{:.2}%", sign, change_pct.round_dp(2))
        }
        Some(PeriodPerformance::Unavailable { .. }) | None => UNAVAILABLE.to_string(),
    }
}

fn describe_reason(performance: Option<&PeriodPerformance>) -> String {
    match performance {
        Some(PeriodPerformance::Unavailable { reason }) => match reason {
            UnavailableReason::MissingHistory { symbols } => {
                format!("not enough history: {}", symbols.join(", "))
            }
            UnavailableReason::ZeroBaseline => "no past value to compare against".to_string(),
            UnavailableReason::Overflow => "value out of range".to_string(),
        },
        Some(PeriodPerformance::Available { past_net_worth, .. }) => {
            format!("from {}", format_money(*past_net_worth))
        }
        None => String::new(),
    }
}

pub fn holdings_table(rows: &[DbHolding]) -> Table {
    let mut table = table(vec!["Symbol", "Quantity", "Name", "Type", "Region"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.symbol),
            right(row.quantity.to_string()),
            Cell::new(text(&row.name)),
            Cell::new(text(&row.asset_type)),
            Cell::new(text(&row.region)),
        ]);
    }
    table
}

pub fn search_table(matches: &[SymbolMatch]) -> Table {
    let mut table = table(vec!["Symbol", "Name", "Type", "Region", "Currency", "Score"]);
    for m in matches {
        table.add_row(vec![
            Cell::new(&m.symbol),
            Cell::new(text(&m.name)),
            Cell::new(text(&m.asset_type)),
            Cell::new(text(&m.region)),
            Cell::new(text(&m.currency)),
            right(m.match_score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())),
        ]);
    }
    table
}

/// Per-holding values followed by the net worth row.
pub fn valuation_table(report: &ValuationReport) -> Table {
    let mut table = table(vec!["Symbol", "Quantity", "Value", "History (days)", "Note"]);
    for line in &report.holdings {
        let (value, note) = match &line.value {
            Outcome::Present(value) => (format_money(*value), String::new()),
            Outcome::Absent => (UNAVAILABLE.to_string(), "no current price".to_string()),
            Outcome::Error(reason) => (UNAVAILABLE.to_string(), reason.clone()),
        };
        let note = if line.dropped_bars > 0 {
            format!("{} malformed bars dropped. {}", line.dropped_bars, note)
        } else {
            note
        };
        table.add_row(vec![
            Cell::new(&line.symbol),
            right(line.quantity.to_string()),
            right(value),
            right(line.history_len.to_string()),
            Cell::new(note.trim()),
        ]);
    }
    table.add_row(vec![
        Cell::new("Net worth"),
        Cell::new(""),
        right(format_money(report.net_worth)),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

pub fn performance_table(report: &ValuationReport) -> Table {
    let mut table = table(vec!["Period", "Change", "Detail"]);
    for period in core_types::Period::ALL {
        let performance = report.performance.get(period);
        table.add_row(vec![
            Cell::new(period.label()),
            right(format_change(performance)),
            Cell::new(describe_reason(performance)),
        ]);
    }
    table
}
