//! Console table rendering for arbitrage evaluations
//!
//! One fixed-width header plus one row per evaluation, shaped for tailing
//! in a terminal session.

use std::fmt::Write;

use chrono::DateTime;

use crate::monitor::{ArbReport, TradeDirection};

/// Column widths, joined by a " | " separator in the rendered lines.
const COLUMN_WIDTHS: [usize; 16] = [12, 11, 11, 10, 10, 11, 11, 10, 10, 9, 9, 8, 8, 18, 12, 8];

/// Renders the two-line column header for the given exchange pair.
#[must_use]
pub fn table_header(first_exchange: &str, second_exchange: &str) -> String {
    let first = column_prefix(first_exchange);
    let second = column_prefix(second_exchange);
    let labels = [
        "Time".to_owned(),
        format!("{first}_Bid"),
        format!("{first}_Ask"),
        format!("{first}_BVol"),
        format!("{first}_AVol"),
        format!("{second}_Bid"),
        format!("{second}_Ask"),
        format!("{second}_BVol"),
        format!("{second}_AVol"),
        "Bid_Diff".to_owned(),
        "Ask_Diff".to_owned(),
        "Bid_%".to_owned(),
        "Ask_%".to_owned(),
        "Best_Direction".to_owned(),
        "Profit_$".to_owned(),
        "Lat_ms".to_owned(),
    ];

    let mut out = String::with_capacity(512);
    for (index, (label, width)) in labels.iter().zip(COLUMN_WIDTHS).enumerate() {
        if index > 0 {
            out.push_str(" | ");
        }
        let _ = write!(out, "{label:<width$}");
    }
    out.push('\n');
    let last = COLUMN_WIDTHS.len() - 1;
    for (index, width) in COLUMN_WIDTHS.into_iter().enumerate() {
        out.push_str(&"-".repeat(width));
        if index < last {
            out.push_str("-+-");
        }
    }
    out
}

/// Renders one evaluation as a table row, without a trailing newline.
#[must_use]
pub fn render_row(report: &ArbReport, first_exchange: &str, second_exchange: &str) -> String {
    let time = DateTime::from_timestamp_millis(report.evaluated_at_ms as i64)
        .map(|stamp| stamp.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| "--:--:--.---".to_owned());
    let (direction, profit) = match report.edge {
        Some(edge) => (
            direction_label(edge.direction, first_exchange, second_exchange),
            edge.profit,
        ),
        None => ("None".to_owned(), 0.0),
    };

    format!(
        "{time:<12} | {:<11.2} | {:<11.2} | {:<10.3} | {:<10.3} | {:<11.2} | {:<11.2} | {:<10.3} | {:<10.3} | {:<9.2} | {:<9.2} | {:<8.3} | {:<8.3} | {direction:<18} | {profit:<12.2} | {:<8}",
        report.first.bid,
        report.first.ask,
        report.first.bid_size,
        report.first.ask_size,
        report.second.bid,
        report.second.ask,
        report.second.bid_size,
        report.second.ask_size,
        report.bid_diff,
        report.ask_diff,
        report.bid_diff_percent,
        report.ask_diff_percent,
        report.staleness_ms,
    )
}

fn direction_label(
    direction: TradeDirection,
    first_exchange: &str,
    second_exchange: &str,
) -> String {
    match direction {
        TradeDirection::BuyFirst => format!("Buy_{}", capitalized(first_exchange)),
        TradeDirection::BuySecond => format!("Buy_{}", capitalized(second_exchange)),
    }
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn column_prefix(name: &str) -> String {
    capitalized(name).chars().take(3).collect()
}
