//! Event routing into the engine state
//!
//! One router instance owns the ledger, book cache, and anomaly detector
//! behind a single mutex; ingestion counters are per-instance atomics.
//! Every accepted trade is classified for anomalies, and every
//! `analysis_interval`-th accepted trade triggers a comprehensive
//! analysis: the snapshots are copied under the lock, the math runs
//! outside it.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use services_common::{FeedEvent, MarketDataError, Trade};
use tracing::debug;

use crate::anomaly::{AnomalyConfig, AnomalyDetector, AnomalyFlags, DetectorStats};
use crate::book::OrderBookCache;
use crate::ledger::TradeLedger;
use crate::metrics::{LiquidityMetrics, MetricsConfig, MetricsEngine};

/// Default number of accepted trades between comprehensive analyses
pub const DEFAULT_ANALYSIS_INTERVAL: u64 = 100;

/// Tuning for the router and the state it owns
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Retained trade count
    pub ledger_capacity: usize,
    /// Accepted trades between comprehensive analyses
    pub analysis_interval: u64,
    /// Metrics engine tuning
    pub metrics: MetricsConfig,
    /// Anomaly detector tuning
    pub anomaly: AnomalyConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ledger_capacity: crate::ledger::DEFAULT_CAPACITY,
            analysis_interval: DEFAULT_ANALYSIS_INTERVAL,
            metrics: MetricsConfig::default(),
            anomaly: AnomalyConfig::default(),
        }
    }
}

/// Counter snapshot for logs and shutdown summaries
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RouterStats {
    /// Accepted trades
    pub trades: u64,
    /// Book snapshots applied
    pub books: u64,
    /// Events that could not be classified
    pub unknown: u64,
    /// Trades rejected at validation
    pub rejected: u64,
    /// Interval-triggered analyses produced
    pub analyses: u64,
}

/// What one event produced
#[derive(Clone, Debug, Default)]
pub struct Outcome {
    /// Anomaly classification when the event was an accepted trade
    pub anomalies: Option<AnomalyFlags>,
    /// Comprehensive analysis when the trade count hit the interval
    pub analysis: Option<LiquidityMetrics>,
}

struct EngineState {
    ledger: TradeLedger,
    book: OrderBookCache,
    detector: AnomalyDetector,
    trades_since_analysis: u64,
}

#[derive(Debug, Default)]
struct Counters {
    trades: AtomicU64,
    books: AtomicU64,
    unknown: AtomicU64,
    rejected: AtomicU64,
    analyses: AtomicU64,
}

/// Routes decoded feed events into the engine state
pub struct EventRouter {
    state: Mutex<EngineState>,
    counters: Counters,
    engine: MetricsEngine,
    analysis_interval: u64,
}

impl EventRouter {
    /// Create a router with the given tuning
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            state: Mutex::new(EngineState {
                ledger: TradeLedger::with_capacity(config.ledger_capacity),
                book: OrderBookCache::new(),
                detector: AnomalyDetector::new(config.anomaly),
                trades_since_analysis: 0,
            }),
            counters: Counters::default(),
            engine: MetricsEngine::new(config.metrics),
            analysis_interval: config.analysis_interval.max(1),
        }
    }

    /// Ingest one decoded event
    ///
    /// Invalid trades surface as `Err` and only bump the rejection
    /// counter; book and unknown events never fail.
    pub fn on_event(&self, event: FeedEvent) -> Result<Outcome, MarketDataError> {
        match event {
            FeedEvent::Trade {
                price,
                size,
                side,
                timestamp_ms,
            } => {
                let trade = match Trade::new(price, size, side, timestamp_ms) {
                    Ok(trade) => trade,
                    Err(err) => {
                        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };
                self.counters.trades.fetch_add(1, Ordering::Relaxed);
                Ok(self.ingest_trade(trade))
            }
            FeedEvent::Book {
                bids,
                asks,
                timestamp_ms,
            } => {
                self.counters.books.fetch_add(1, Ordering::Relaxed);
                self.state.lock().book.update(bids, asks, timestamp_ms);
                Ok(Outcome::default())
            }
            FeedEvent::Unknown => {
                self.counters.unknown.fetch_add(1, Ordering::Relaxed);
                Ok(Outcome::default())
            }
        }
    }

    /// On-demand comprehensive analysis anchored at `now_ms`
    #[must_use]
    pub fn analyze_now(&self, now_ms: u64) -> LiquidityMetrics {
        let (trades, book) = {
            let state = self.state.lock();
            (state.ledger.snapshot(), state.book.snapshot().clone())
        };
        self.engine.analyze(&trades, &book, now_ms)
    }

    /// Counter snapshot
    #[must_use]
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            trades: self.counters.trades.load(Ordering::Relaxed),
            books: self.counters.books.load(Ordering::Relaxed),
            unknown: self.counters.unknown.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            analyses: self.counters.analyses.load(Ordering::Relaxed),
        }
    }

    /// Detector state for operator logs
    #[must_use]
    pub fn detector_stats(&self) -> DetectorStats {
        self.state.lock().detector.stats()
    }

    fn ingest_trade(&self, trade: Trade) -> Outcome {
        let (flags, snapshots) = {
            let mut state = self.state.lock();
            state.ledger.push(trade);
            let flags = state.detector.on_trade(&trade);
            state.trades_since_analysis += 1;

            let due = state.trades_since_analysis >= self.analysis_interval;
            let snapshots = due.then(|| {
                state.trades_since_analysis = 0;
                (state.ledger.snapshot(), state.book.snapshot().clone())
            });
            (flags, snapshots)
        };

        let analysis = snapshots.map(|(trades, book)| {
            self.counters.analyses.fetch_add(1, Ordering::Relaxed);
            debug!(trades = trades.len(), "Running comprehensive analysis");
            self.engine.analyze(&trades, &book, trade.timestamp_ms)
        });

        Outcome {
            anomalies: Some(flags),
            analysis,
        }
    }
}
