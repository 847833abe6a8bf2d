//! Nearby-strike scan and its human-readable rendering.

use std::fmt::Write;

use serde::Serialize;
use services_common::{DAYS_PER_YEAR, PricingError};

use crate::black_scholes::{BlackScholes, Greeks, OptionType};

// The scan prices a 5% out-of-the-money call and put around the spot.
// Premiums, volume and open interest are synthetic stand-ins shaped like
// typical crypto options quotes; a live options chain would supply real ones.
const CALL_STRIKE_RATIO: f64 = 1.05;
const PUT_STRIKE_RATIO: f64 = 0.95;
const CALL_PREMIUM_RATIO: f64 = 0.02;
const PUT_PREMIUM_RATIO: f64 = 0.015;
const EXAMPLE_VOLUME: u64 = 1500;
const EXAMPLE_OPEN_INTEREST: u64 = 5000;

/// One priced contract out of the nearby-strike scan.
#[derive(Debug, Clone, Serialize)]
pub struct OptionQuote {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price in quote currency.
    pub strike: f64,
    /// Observed market premium for the contract.
    pub option_price: f64,
    /// Volatility backing the model values.
    pub implied_volatility: f64,
    /// Exercise value at the current spot.
    pub intrinsic_value: f64,
    /// Premium paid over exercise value.
    pub extrinsic_value: f64,
    /// Contracts traded.
    pub volume: u64,
    /// Open contracts outstanding.
    pub open_interest: u64,
    /// Closed-form sensitivities.
    pub greeks: Greeks,
}

/// Call/put pair bracketing the spot, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyStrikeReport {
    /// Instrument the spot price came from.
    pub symbol: String,
    /// Spot price the strikes are anchored to.
    pub spot: f64,
    /// Risk-free rate used for discounting.
    pub rate: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    /// The 5% out-of-the-money call.
    pub call: OptionQuote,
    /// The 5% out-of-the-money put.
    pub put: OptionQuote,
}

/// Prices the 5% out-of-the-money call and put around the given spot.
pub fn nearby_strike_report(
    symbol: &str,
    spot: f64,
    rate: f64,
    volatility: f64,
    days_to_expiry: f64,
) -> Result<NearbyStrikeReport, PricingError> {
    let time_to_expiry = days_to_expiry / DAYS_PER_YEAR;
    let call = quote(
        OptionType::Call,
        spot,
        spot * CALL_STRIKE_RATIO,
        spot * CALL_PREMIUM_RATIO,
        rate,
        volatility,
        time_to_expiry,
    )?;
    let put = quote(
        OptionType::Put,
        spot,
        spot * PUT_STRIKE_RATIO,
        spot * PUT_PREMIUM_RATIO,
        rate,
        volatility,
        time_to_expiry,
    )?;
    Ok(NearbyStrikeReport {
        symbol: symbol.to_owned(),
        spot,
        rate,
        time_to_expiry,
        call,
        put,
    })
}

fn quote(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    option_price: f64,
    rate: f64,
    volatility: f64,
    time: f64,
) -> Result<OptionQuote, PricingError> {
    let greeks = BlackScholes::greeks(option_type, spot, strike, rate, volatility, time)?;
    let intrinsic_value = BlackScholes::intrinsic(option_type, spot, strike);
    Ok(OptionQuote {
        option_type,
        strike,
        option_price,
        implied_volatility: volatility,
        intrinsic_value,
        extrinsic_value: option_price - intrinsic_value,
        volume: EXAMPLE_VOLUME,
        open_interest: EXAMPLE_OPEN_INTEREST,
        greeks,
    })
}

/// Renders both contracts of a scan as console analysis blocks.
#[must_use]
pub fn console_report(report: &NearbyStrikeReport) -> String {
    let mut out = String::with_capacity(2048);
    render_block(
        &mut out,
        &format!("{} Call Option", report.symbol),
        report,
        &report.call,
    );
    render_block(
        &mut out,
        &format!("{} Put Option", report.symbol),
        report,
        &report.put,
    );
    out
}

fn render_block(out: &mut String, title: &str, report: &NearbyStrikeReport, quote: &OptionQuote) {
    let rule = "=".repeat(60);
    let greeks = &quote.greeks;

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "OPTIONS ANALYSIS FOR: {title}");
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out);
    let _ = writeln!(out, "MARKET DATA:");
    let _ = writeln!(out, "  Spot Price:        ${:.4}", report.spot);
    let _ = writeln!(out, "  Strike Price:      ${:.4}", quote.strike);
    let _ = writeln!(out, "  Option Price:      ${:.4}", quote.option_price);
    let _ = writeln!(out, "  Time to Expiry:    {:.4} years", report.time_to_expiry);
    let _ = writeln!(out, "  Volume:            {}", quote.volume);
    let _ = writeln!(out, "  Open Interest:     {}", quote.open_interest);

    let _ = writeln!(out);
    let _ = writeln!(out, "OPTION VALUES:");
    let _ = writeln!(out, "  Intrinsic Value:   ${:.4}", quote.intrinsic_value);
    let _ = writeln!(out, "  Extrinsic Value:   ${:.4}", quote.extrinsic_value);
    let _ = writeln!(
        out,
        "  Implied Volatility: {:.4}%",
        quote.implied_volatility * 100.0
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "THE GREEKS:");
    let _ = writeln!(out, "  Delta (Δ):         {:.4}", greeks.delta);
    let _ = writeln!(out, "  Gamma (Γ):         {:.4}", greeks.gamma);
    let _ = writeln!(out, "  Theta (Θ):         ${:.4} per day", greeks.theta);
    let _ = writeln!(out, "  Vega (ν):          ${:.4} per 1% IV", greeks.vega);
    let _ = writeln!(out, "  Rho (ρ):           ${:.4} per 1% rate", greeks.rho);

    let _ = writeln!(out);
    let _ = writeln!(out, "GREEKS INTERPRETATION:");
    let _ = writeln!(
        out,
        "  Delta: Option price changes by ${:.4} for each $1 move in underlying",
        greeks.delta.abs()
    );
    let _ = writeln!(
        out,
        "  Gamma: Delta changes by {:.4} for each $1 move in underlying",
        greeks.gamma
    );
    let _ = writeln!(
        out,
        "  Theta: Option loses ${:.4} in value each day (time decay)",
        greeks.theta.abs()
    );
    let _ = writeln!(
        out,
        "  Vega: Option price changes by ${:.4} for each 1% change in volatility",
        greeks.vega.abs()
    );
}
