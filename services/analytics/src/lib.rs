//! # Market Liquidity Analytics
//!
//! Streaming analysis of trade and order book data:
//! - Bounded trade ledger and validated order book cache
//! - Liquidity metrics: spread, depth, VWAP, slippage, book slope
//! - Microstructure measures: Kyle's lambda, Amihud illiquidity
//! - Risk measures: realized/historical volatility, VaR, expected shortfall
//! - Streaming anomaly detection with adaptive thresholds
//!
//! [`router::EventRouter`] ties the pieces together: feed events go in,
//! anomaly flags and periodic metric reports come out.

#![warn(missing_docs)]

pub mod anomaly;
pub mod book;
pub mod decode;
pub mod ledger;
pub mod metrics;
pub mod report;
pub mod router;

// Re-exports for convenience
pub use crate::anomaly::{AnomalyConfig, AnomalyDetector, AnomalyFlags, DetectorStats};
pub use crate::book::{BookSnapshot, OrderBookCache};
pub use crate::decode::decode_fields;
pub use crate::ledger::TradeLedger;
pub use crate::metrics::{
    AmihudMeasures, KyleLambdas, LiquidityMetrics, MetricsConfig, MetricsEngine,
};
pub use crate::report::{console_summary, render_json};
pub use crate::router::{EventRouter, Outcome, RouterConfig, RouterStats};
