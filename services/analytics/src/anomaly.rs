//! Streaming trade anomaly detection
//!
//! Keeps a small sliding window of recent trades plus an EWMA variance
//! estimate and classifies each incoming trade for price-move, size, and
//! volatility anomalies. Size and price thresholds adapt to the window
//! (90th / 95th percentile with fixed floors) once enough samples exist.
//! The very first trade only seeds the state and never raises flags.

use std::collections::VecDeque;

use serde::Serialize;
use services_common::Trade;

/// Default sliding window length, in trades
pub const DEFAULT_WINDOW: usize = 50;
/// Default samples required before thresholds adapt
pub const DEFAULT_MIN_SAMPLES: usize = 10;
/// Default EWMA decay factor, tuned for high-frequency crypto prints
pub const DEFAULT_EWMA_LAMBDA: f64 = 0.92;
/// Default EWMA volatility alarm level
pub const DEFAULT_VOLATILITY_THRESHOLD: f64 = 0.02;
/// Default multiple of average size that flags a trade
pub const DEFAULT_SIZE_MULTIPLIER: f64 = 3.0;
/// Default multiple of average price deviation that flags a move
pub const DEFAULT_PRICE_DEVIATION_MULTIPLIER: f64 = 2.5;

/// Size threshold before enough samples exist
const INITIAL_SIZE_THRESHOLD: f64 = 1.0;
/// Price-move threshold before enough samples exist
const INITIAL_PRICE_THRESHOLD: f64 = 100.0;
/// Adaptive size threshold never drops below this
const SIZE_THRESHOLD_FLOOR: f64 = 1.0;
/// Adaptive price-move threshold never drops below this
const PRICE_THRESHOLD_FLOOR: f64 = 10.0;
/// Variance assigned when the first price seeds the EWMA
const EWMA_SEED_VARIANCE: f64 = 1e-4;
/// Percentile rank for the adaptive size threshold
const SIZE_PERCENTILE: f64 = 0.90;
/// Percentile rank for the adaptive price-move threshold
const PRICE_PERCENTILE: f64 = 0.95;

/// Tuning for the anomaly detector
#[derive(Clone, Debug)]
pub struct AnomalyConfig {
    /// Sliding window length, in trades
    pub window: usize,
    /// Samples required before thresholds adapt
    pub min_samples: usize,
    /// EWMA decay factor
    pub ewma_lambda: f64,
    /// EWMA volatility alarm level
    pub volatility_threshold: f64,
    /// Multiple of average size that flags a trade
    pub size_multiplier: f64,
    /// Multiple of average price deviation that flags a move
    pub price_deviation_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            min_samples: DEFAULT_MIN_SAMPLES,
            ewma_lambda: DEFAULT_EWMA_LAMBDA,
            volatility_threshold: DEFAULT_VOLATILITY_THRESHOLD,
            size_multiplier: DEFAULT_SIZE_MULTIPLIER,
            price_deviation_multiplier: DEFAULT_PRICE_DEVIATION_MULTIPLIER,
        }
    }
}

/// Classification of one trade
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AnomalyFlags {
    /// Price jumped versus the previous trade
    pub price: bool,
    /// Trade size stands out against the window
    pub size: bool,
    /// EWMA volatility is above the alarm level
    pub volatility: bool,
}

impl AnomalyFlags {
    /// True when any flag fired
    #[must_use]
    pub const fn any(self) -> bool {
        self.price || self.size || self.volatility
    }
}

/// Point-in-time detector state for operator logs
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DetectorStats {
    /// Trades ever fed to the detector
    pub trades_seen: u64,
    /// Current window occupancy
    pub window_len: usize,
    /// Mean price over the window
    pub average_price: f64,
    /// Mean size over the window
    pub average_size: f64,
    /// EWMA volatility, absent until seeded
    pub ewma_volatility: Option<f64>,
    /// EWMA variance, absent until seeded
    pub ewma_variance: Option<f64>,
    /// Current adaptive size threshold
    pub size_threshold: f64,
    /// Current adaptive price-move threshold
    pub price_move_threshold: f64,
    /// Configured volatility alarm level
    pub volatility_threshold: f64,
}

#[derive(Clone, Copy, Debug)]
struct EwmaState {
    variance: f64,
    previous_price: f64,
}

/// Streaming anomaly detector over validated trades
#[derive(Clone, Debug)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    window: VecDeque<Trade>,
    trades_seen: u64,
    size_threshold: f64,
    price_move_threshold: f64,
    ewma: Option<EwmaState>,
}

impl AnomalyDetector {
    /// Create a detector with the given tuning
    #[must_use]
    pub fn new(config: AnomalyConfig) -> Self {
        let window = config.window.max(1);
        Self {
            config,
            window: VecDeque::with_capacity(window),
            trades_seen: 0,
            size_threshold: INITIAL_SIZE_THRESHOLD,
            price_move_threshold: INITIAL_PRICE_THRESHOLD,
            ewma: None,
        }
    }

    /// Ingest one trade and classify it
    ///
    /// The first trade seeds the EWMA and the window and always returns
    /// clear flags.
    pub fn on_trade(&mut self, trade: &Trade) -> AnomalyFlags {
        self.window.push_back(*trade);
        self.trades_seen += 1;

        let seeding = self.update_ewma(trade.price);

        while self.window.len() > self.config.window.max(1) {
            self.window.pop_front();
        }

        self.update_thresholds();

        if seeding {
            return AnomalyFlags::default();
        }

        AnomalyFlags {
            price: self.price_anomaly(trade.price),
            size: self.size_anomaly(trade.size),
            volatility: self.volatility_anomaly(),
        }
    }

    /// Trades ever fed to the detector
    #[must_use]
    pub const fn trades_seen(&self) -> u64 {
        self.trades_seen
    }

    /// Snapshot of the detector state for operator logs
    #[must_use]
    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            trades_seen: self.trades_seen,
            window_len: self.window.len(),
            average_price: self.average_price(),
            average_size: self.average_size(),
            ewma_volatility: self.ewma.as_ref().map(|s| s.variance.sqrt()),
            ewma_variance: self.ewma.as_ref().map(|s| s.variance),
            size_threshold: self.size_threshold,
            price_move_threshold: self.price_move_threshold,
            volatility_threshold: self.config.volatility_threshold,
        }
    }

    /// True at the trade counts where the service logs detector statistics
    #[must_use]
    pub const fn is_stats_checkpoint(count: u64) -> bool {
        count == 20 || count == 50 || (count > 50 && count % 50 == 0)
    }

    /// Returns true when this price seeded a fresh EWMA state
    fn update_ewma(&mut self, price: f64) -> bool {
        match self.ewma.as_mut() {
            None => {
                self.ewma = Some(EwmaState {
                    variance: EWMA_SEED_VARIANCE,
                    previous_price: price,
                });
                true
            }
            Some(state) => {
                let log_return = (price / state.previous_price).ln();
                state.variance = self.config.ewma_lambda * state.variance
                    + (1.0 - self.config.ewma_lambda) * log_return * log_return;
                state.previous_price = price;
                false
            }
        }
    }

    fn update_thresholds(&mut self) {
        if self.window.len() < self.config.min_samples {
            return;
        }

        let mut volumes: Vec<f64> = self.window.iter().map(|t| t.size).collect();
        let mut price_changes: Vec<f64> = self.consecutive_price_changes();

        if !volumes.is_empty() {
            volumes.sort_by(f64::total_cmp);
            let idx = percentile_index(volumes.len(), SIZE_PERCENTILE);
            self.size_threshold = volumes[idx].max(SIZE_THRESHOLD_FLOOR);
        }

        if !price_changes.is_empty() {
            price_changes.sort_by(f64::total_cmp);
            let idx = percentile_index(price_changes.len(), PRICE_PERCENTILE);
            self.price_move_threshold = price_changes[idx].max(PRICE_THRESHOLD_FLOOR);
        }
    }

    fn price_anomaly(&self, price: f64) -> bool {
        if self.window.len() < 2 {
            return false;
        }
        let avg_deviation = self.average_price_deviation();
        if avg_deviation <= 0.0 {
            return false;
        }

        let previous = self.window[self.window.len() - 2].price;
        let change = (price - previous).abs();
        change > self.price_move_threshold
            || change > avg_deviation * self.config.price_deviation_multiplier
    }

    fn size_anomaly(&self, size: f64) -> bool {
        let absolute = size > self.size_threshold;
        if self.window.len() < self.config.min_samples {
            return absolute;
        }
        let avg_size = self.average_size();
        if avg_size <= 0.0 {
            return absolute;
        }
        absolute || size > avg_size * self.config.size_multiplier
    }

    fn volatility_anomaly(&self) -> bool {
        self.ewma
            .as_ref()
            .is_some_and(|state| state.variance.sqrt() > self.config.volatility_threshold)
    }

    fn average_price(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().map(|t| t.price).sum::<f64>() / self.window.len() as f64
    }

    fn average_size(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().map(|t| t.size).sum::<f64>() / self.window.len() as f64
    }

    fn average_price_deviation(&self) -> f64 {
        if self.window.len() < 2 {
            return 0.0;
        }
        let sum: f64 = self.consecutive_price_changes().iter().sum();
        sum / (self.window.len() - 1) as f64
    }

    fn consecutive_price_changes(&self) -> Vec<f64> {
        self.window
            .iter()
            .zip(self.window.iter().skip(1))
            .map(|(a, b)| (b.price - a.price).abs())
            .collect()
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

/// Truncating percentile rank clamped to the last index
fn percentile_index(len: usize, quantile: f64) -> usize {
    ((len as f64 * quantile) as usize).min(len.saturating_sub(1))
}
