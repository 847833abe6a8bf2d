//! # Arbitrage Monitor
//!
//! Two-exchange top-of-book comparison:
//! - Merges partial quote updates into one slot per exchange
//! - Evaluates bid/ask differences and crossed-market round trips on
//!   every price move once both feeds are live
//! - Renders evaluations as a fixed-width console table
//!
//! The monitor is passive and synchronous; feeding it updates and
//! choosing a clock are the caller's jobs.

#![warn(missing_docs)]

pub mod monitor;
pub mod table;

// Re-exports for convenience
pub use crate::monitor::{
    ArbConfig, ArbEdge, ArbMonitor, ArbReport, ExchangeQuote, QuoteUpdate, TradeDirection,
};
pub use crate::table::{render_row, table_header};
