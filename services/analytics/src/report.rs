//! Rendering of analysis results for machine and human consumers.

use std::fmt::Write;

use crate::metrics::LiquidityMetrics;

/// Formats a value with the fixed JSON precision used across reports.
fn fixed(value: f64) -> String {
    format!("{value:.8}")
}

/// Formats an optional value, rendering absent measurements as `null`.
fn fixed_or_null(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_owned(), fixed)
}

/// Renders the full metrics set as a JSON object with a stable key order.
///
/// Optional measurements that could not be computed render as `null` rather
/// than a placeholder number, so downstream consumers can tell "zero" apart
/// from "unknown".
#[must_use]
pub fn render_json(metrics: &LiquidityMetrics) -> String {
    let mut out = String::with_capacity(768);
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "  \"spread\": {},", fixed(metrics.spread));
    let _ = writeln!(
        out,
        "  \"relative_spread\": {},",
        fixed_or_null(metrics.relative_spread)
    );
    let _ = writeln!(out, "  \"bid_depth\": {},", fixed(metrics.bid_depth));
    let _ = writeln!(out, "  \"ask_depth\": {},", fixed(metrics.ask_depth));
    let _ = writeln!(
        out,
        "  \"order_book_imbalance\": {},",
        fixed_or_null(metrics.order_book_imbalance)
    );
    let _ = writeln!(out, "  \"bid_vwap\": {},", fixed_or_null(metrics.bid_vwap));
    let _ = writeln!(out, "  \"ask_vwap\": {},", fixed_or_null(metrics.ask_vwap));
    let _ = writeln!(
        out,
        "  \"bid_slippage\": {},",
        fixed_or_null(metrics.bid_slippage)
    );
    let _ = writeln!(
        out,
        "  \"ask_slippage\": {},",
        fixed_or_null(metrics.ask_slippage)
    );
    let _ = writeln!(out, "  \"bid_slope\": {},", fixed(metrics.bid_slope));
    let _ = writeln!(out, "  \"ask_slope\": {},", fixed(metrics.ask_slope));
    let _ = writeln!(
        out,
        "  \"realized_volatility\": {},",
        fixed(metrics.realized_volatility)
    );
    let _ = writeln!(out, "  \"var_95\": {},", fixed(metrics.var_95));
    let _ = writeln!(
        out,
        "  \"expected_shortfall_95\": {},",
        fixed(metrics.expected_shortfall_95)
    );
    let _ = writeln!(
        out,
        "  \"historical_volatility\": {},",
        fixed_or_null(metrics.historical_volatility)
    );
    let _ = writeln!(out, "  \"kyles_lambda\": {{");
    let _ = writeln!(out, "    \"daily\": {},", fixed(metrics.kyles_lambda.daily));
    let _ = writeln!(out, "    \"hourly\": {}", fixed(metrics.kyles_lambda.hourly));
    let _ = writeln!(out, "  }},");
    let _ = writeln!(out, "  \"amihud_measures\": {{");
    let _ = writeln!(
        out,
        "    \"1_day\": {},",
        fixed(metrics.amihud_measures.one_day)
    );
    let _ = writeln!(
        out,
        "    \"30_days\": {},",
        fixed(metrics.amihud_measures.thirty_days)
    );
    let _ = writeln!(
        out,
        "    \"90_days\": {}",
        fixed(metrics.amihud_measures.ninety_days)
    );
    let _ = writeln!(out, "  }}");
    let _ = write!(out, "}}");
    out
}

fn dollars_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| format!("{v:.2}"))
}

fn ratio_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| format!("{v:.4}"))
}

fn percent_or_na(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(
        || "N/A".to_owned(),
        |v| format!("{:.precision$}%", v * 100.0),
    )
}

/// Renders a human-readable summary of the metrics set for one symbol.
#[must_use]
pub fn console_summary(symbol: &str, metrics: &LiquidityMetrics) -> String {
    let rule = "=".repeat(80);
    let section = "-".repeat(40);
    let mut out = String::with_capacity(1536);

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "COMPREHENSIVE LIQUIDITY ANALYSIS FOR: {symbol}");
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out);
    let _ = writeln!(out, "ORDER BOOK METRICS:");
    let _ = writeln!(out, "{section}");
    let _ = writeln!(out, "  Spread:                ${:.2}", metrics.spread);
    let _ = writeln!(
        out,
        "  Relative Spread:       {}",
        percent_or_na(metrics.relative_spread, 4)
    );
    let _ = writeln!(out, "  Bid Depth:             {:.2}", metrics.bid_depth);
    let _ = writeln!(out, "  Ask Depth:             {:.2}", metrics.ask_depth);
    let _ = writeln!(
        out,
        "  Order Book Imbalance:  {}",
        ratio_or_na(metrics.order_book_imbalance)
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "VWAP & SLIPPAGE ANALYSIS:");
    let _ = writeln!(out, "{section}");
    let _ = writeln!(
        out,
        "  Bid VWAP:              ${}",
        dollars_or_na(metrics.bid_vwap)
    );
    let _ = writeln!(
        out,
        "  Ask VWAP:              ${}",
        dollars_or_na(metrics.ask_vwap)
    );
    let _ = writeln!(
        out,
        "  Bid Slippage:          {}",
        percent_or_na(metrics.bid_slippage, 4)
    );
    let _ = writeln!(
        out,
        "  Ask Slippage:          {}",
        percent_or_na(metrics.ask_slippage, 4)
    );
    let _ = writeln!(out, "  Bid Slope:             {:.6}", metrics.bid_slope);
    let _ = writeln!(out, "  Ask Slope:             {:.6}", metrics.ask_slope);

    let _ = writeln!(out);
    let _ = writeln!(out, "MARKET MICROSTRUCTURE:");
    let _ = writeln!(out, "{section}");
    let _ = writeln!(out, "  Kyle's Lambda:");
    let _ = writeln!(
        out,
        "    Daily:               {:.8}",
        metrics.kyles_lambda.daily
    );
    let _ = writeln!(
        out,
        "    Hourly:              {:.8}",
        metrics.kyles_lambda.hourly
    );
    let _ = writeln!(out, "  Amihud Measures:");
    let _ = writeln!(
        out,
        "    1 Day:               {:.8}",
        metrics.amihud_measures.one_day
    );
    let _ = writeln!(
        out,
        "    30 Days:             {:.8}",
        metrics.amihud_measures.thirty_days
    );
    let _ = writeln!(
        out,
        "    90 Days:             {:.8}",
        metrics.amihud_measures.ninety_days
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "RISK METRICS:");
    let _ = writeln!(out, "{section}");
    let _ = writeln!(
        out,
        "  Realized Volatility:   {:.2}%",
        metrics.realized_volatility
    );
    let _ = writeln!(
        out,
        "  Historical Volatility: {}",
        metrics
            .historical_volatility
            .map_or_else(|| "N/A".to_owned(), |v| format!("{v:.2}%"))
    );
    let _ = writeln!(out, "  VaR (95%):             {:.4}%", metrics.var_95);
    let _ = writeln!(
        out,
        "  Expected Shortfall:    {:.4}%",
        metrics.expected_shortfall_95
    );

    let _ = write!(out, "{rule}");
    out
}
