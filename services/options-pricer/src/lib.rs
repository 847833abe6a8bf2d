//! # Options Pricing
//!
//! Closed-form Black-Scholes for European options on a non-dividend
//! underlying:
//! - Prices, intrinsic/extrinsic split and the first-order Greeks
//! - Newton-Raphson implied volatility with bounded iterates
//! - A nearby-strike call/put scan with a console rendering
//!
//! Everything here is a pure function of its inputs; market data stays in
//! the analytics crate.

#![warn(missing_docs)]

pub mod black_scholes;
pub mod report;

// Re-exports for convenience
pub use crate::black_scholes::{BlackScholes, Greeks, OptionType};
pub use crate::report::{console_report, nearby_strike_report, NearbyStrikeReport, OptionQuote};
