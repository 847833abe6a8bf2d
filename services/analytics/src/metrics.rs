//! Liquidity and risk metrics over trade and book snapshots
//!
//! All computation here is pure: functions take the trade window and the
//! book snapshot by reference and return values, so callers decide how
//! state is locked and copied. `Option` marks metrics that are undefined
//! for the input; a plain zero is always a real measurement.

use rustc_hash::FxHashMap;
use serde::Serialize;
use services_common::{
    BookLevel, MILLIS_PER_DAY, MILLIS_PER_HOUR, TRADING_HOURS_PER_YEAR, Trade,
};

use crate::book::BookSnapshot;

/// Book levels consumed by depth, imbalance, and slope
pub const DEFAULT_DEPTH_LEVELS: usize = 10;
/// Target volume for the VWAP walk, in base units
pub const DEFAULT_VWAP_TARGET_VOLUME: f64 = 1.0;
/// Rolling window for historical volatility, in returns
pub const HISTORICAL_VOL_WINDOW: usize = 30;

/// Tail mass for VaR and expected shortfall
const TAIL_QUANTILE: f64 = 0.05;
/// Log returns at or beyond this magnitude are treated as feed errors
const MAX_ABS_LOG_RETURN: f64 = 1.0;

/// Tuning for the metrics engine
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Book levels consumed by depth, imbalance, and slope
    pub depth_levels: usize,
    /// Target volume for the VWAP walk
    pub vwap_target_volume: f64,
    /// Window for the daily Kyle's lambda estimate, in ms
    pub kyle_daily_window_ms: u64,
    /// Window for the hourly Kyle's lambda estimate, in ms
    pub kyle_hourly_window_ms: u64,
    /// Amihud lookbacks in days, shortest first
    pub amihud_periods_days: [u64; 3],
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            depth_levels: DEFAULT_DEPTH_LEVELS,
            vwap_target_volume: DEFAULT_VWAP_TARGET_VOLUME,
            kyle_daily_window_ms: MILLIS_PER_DAY,
            kyle_hourly_window_ms: MILLIS_PER_HOUR,
            amihud_periods_days: [1, 30, 90],
        }
    }
}

/// Kyle's lambda at two horizons
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct KyleLambdas {
    /// Estimate over the daily window
    pub daily: f64,
    /// Estimate over the hourly window
    pub hourly: f64,
}

/// Amihud illiquidity at three lookbacks
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AmihudMeasures {
    /// Shortest lookback
    #[serde(rename = "1_day")]
    pub one_day: f64,
    /// Medium lookback
    #[serde(rename = "30_days")]
    pub thirty_days: f64,
    /// Longest lookback
    #[serde(rename = "90_days")]
    pub ninety_days: f64,
}

/// Return-based risk metrics over the trade window's price path
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Annualized close-to-close volatility, percent
    pub realized_volatility: f64,
    /// Log return at the 5th-percentile rank, percent
    pub var_95: f64,
    /// Mean log return below the VaR rank, percent
    pub expected_shortfall_95: f64,
    /// Annualized volatility over the trailing window, percent
    pub historical_volatility: Option<f64>,
}

/// Comprehensive liquidity analysis output
///
/// Field order matches the published JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LiquidityMetrics {
    /// Best ask minus best bid
    pub spread: f64,
    /// Spread over mid price; absent without a two-sided book
    pub relative_spread: Option<f64>,
    /// Total bid size over the configured depth
    pub bid_depth: f64,
    /// Total ask size over the configured depth
    pub ask_depth: f64,
    /// (bid − ask) / (bid + ask) depth; absent when both depths are zero
    pub order_book_imbalance: Option<f64>,
    /// VWAP walking the bid side; absent when nothing can be consumed
    pub bid_vwap: Option<f64>,
    /// VWAP walking the ask side; absent when nothing can be consumed
    pub ask_vwap: Option<f64>,
    /// Relative cost of selling into the bid side
    pub bid_slippage: Option<f64>,
    /// Relative cost of buying from the ask side
    pub ask_slippage: Option<f64>,
    /// OLS slope of bid prices on cumulative bid volume
    pub bid_slope: f64,
    /// OLS slope of ask prices on cumulative ask volume
    pub ask_slope: f64,
    /// Annualized close-to-close volatility, percent
    pub realized_volatility: f64,
    /// Log return at the 5th-percentile rank, percent
    pub var_95: f64,
    /// Mean log return below the VaR rank, percent
    pub expected_shortfall_95: f64,
    /// Annualized volatility over the trailing window, percent
    pub historical_volatility: Option<f64>,
    /// Price impact per signed unit of volume
    pub kyles_lambda: KyleLambdas,
    /// Illiquidity per unit of notional
    pub amihud_measures: AmihudMeasures,
}

/// Stateless metrics engine configured once at startup
#[derive(Clone, Debug, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    /// Create an engine with the given tuning
    #[must_use]
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Current tuning
    #[must_use]
    pub const fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Full liquidity analysis over one consistent pair of snapshots
    ///
    /// `now_ms` anchors the Kyle and Amihud lookback windows; feeding the
    /// triggering trade's own timestamp keeps replayed history windowed
    /// against feed time.
    #[must_use]
    pub fn analyze(&self, trades: &[Trade], book: &BookSnapshot, now_ms: u64) -> LiquidityMetrics {
        let mut metrics = LiquidityMetrics::default();

        let risk = risk_summary(trades);
        metrics.realized_volatility = risk.realized_volatility;
        metrics.var_95 = risk.var_95;
        metrics.expected_shortfall_95 = risk.expected_shortfall_95;
        metrics.historical_volatility = risk.historical_volatility;

        self.book_metrics(book, &mut metrics);

        metrics.kyles_lambda = KyleLambdas {
            daily: kyles_lambda(trades, now_ms, self.config.kyle_daily_window_ms),
            hourly: kyles_lambda(trades, now_ms, self.config.kyle_hourly_window_ms),
        };

        let [short, medium, long] = self.config.amihud_periods_days;
        metrics.amihud_measures = AmihudMeasures {
            one_day: amihud_measure(trades, now_ms, short),
            thirty_days: amihud_measure(trades, now_ms, medium),
            ninety_days: amihud_measure(trades, now_ms, long),
        };

        metrics
    }

    /// Spread, depth, imbalance, VWAP, slippage, and slope
    ///
    /// Leaves the defaults untouched unless the book is two-sided.
    fn book_metrics(&self, book: &BookSnapshot, metrics: &mut LiquidityMetrics) {
        let (Some(best_bid), Some(best_ask)) = (book.best_bid(), book.best_ask()) else {
            return;
        };
        let best_bid = best_bid.price;
        let best_ask = best_ask.price;

        metrics.spread = best_ask - best_bid;
        let mid_price = (best_ask + best_bid) / 2.0;
        if mid_price > 0.0 {
            metrics.relative_spread = Some(metrics.spread / mid_price);
        }

        let depth = self.config.depth_levels;
        metrics.bid_depth = depth_volume(&book.bids, depth);
        metrics.ask_depth = depth_volume(&book.asks, depth);

        let total_depth = metrics.bid_depth + metrics.ask_depth;
        if total_depth > 0.0 {
            metrics.order_book_imbalance =
                Some((metrics.bid_depth - metrics.ask_depth) / total_depth);
        }

        if let Some(bid_vwap) = vwap(&book.bids, self.config.vwap_target_volume) {
            metrics.bid_vwap = Some(bid_vwap);
            metrics.bid_slippage = Some((best_bid - bid_vwap) / best_bid);
        }
        if let Some(ask_vwap) = vwap(&book.asks, self.config.vwap_target_volume) {
            metrics.ask_vwap = Some(ask_vwap);
            metrics.ask_slippage = Some((ask_vwap - best_ask) / best_ask);
        }

        metrics.bid_slope = book_slope(&book.bids, depth);
        metrics.ask_slope = book_slope(&book.asks, depth);
    }
}

/// Sum of level sizes over the top `depth` levels
#[must_use]
pub fn depth_volume(levels: &[BookLevel], depth: usize) -> f64 {
    levels.iter().take(depth).map(|l| l.size).sum()
}

/// Volume-weighted average price consuming `target_volume` best-first
///
/// Walks levels in stored order, taking `min(level size, remaining)` at
/// each. `None` when the side is empty, the target is non-positive, or
/// nothing could be consumed.
#[must_use]
pub fn vwap(levels: &[BookLevel], target_volume: f64) -> Option<f64> {
    if levels.is_empty() || target_volume <= 0.0 {
        return None;
    }

    let mut remaining = target_volume;
    let mut weighted = 0.0;
    let mut consumed = 0.0;

    for level in levels {
        if remaining <= 0.0 {
            break;
        }
        let take = level.size.min(remaining);
        weighted += level.price * take;
        consumed += take;
        remaining -= take;
    }

    (consumed > 0.0).then(|| weighted / consumed)
}

/// OLS slope of price against cumulative volume over the top levels
///
/// Zero when fewer than two levels are available.
#[must_use]
pub fn book_slope(levels: &[BookLevel], depth: usize) -> f64 {
    let count = depth.min(levels.len());
    if count < 2 {
        return 0.0;
    }

    let mut cumulative = 0.0;
    let mut volumes = Vec::with_capacity(count);
    let mut prices = Vec::with_capacity(count);
    for level in &levels[..count] {
        cumulative += level.size;
        volumes.push(cumulative);
        prices.push(level.price);
    }

    ols_slope(&volumes, &prices)
}

/// Kyle's lambda: price impact per signed unit of traded volume
///
/// Regresses consecutive-trade log returns on the later trade's signed
/// volume, over pairs whose later trade is younger than `window_ms`
/// relative to `now_ms`. Returns at or beyond unit magnitude are treated
/// as feed errors and skipped. Zero when fewer than two pairs survive.
#[must_use]
pub fn kyles_lambda(trades: &[Trade], now_ms: u64, window_ms: u64) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }

    let mut log_returns = Vec::new();
    let mut signed_volumes = Vec::new();

    for pair in trades.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if now_ms.saturating_sub(curr.timestamp_ms) > window_ms {
            continue;
        }

        let log_return = (curr.price / prev.price).ln();
        if log_return.is_finite() && log_return.abs() < MAX_ABS_LOG_RETURN {
            log_returns.push(log_return);
            signed_volumes.push(curr.size * curr.side.signed_unit());
        }
    }

    if log_returns.len() < 2 {
        return 0.0;
    }

    ols_slope(&signed_volumes, &log_returns)
}

/// Amihud illiquidity: mean over day buckets of |return| per notional
///
/// Consecutive-trade pairs are bucketed by the later trade's UTC day;
/// pairs spanning a day boundary or older than `period_days` are skipped.
/// Zero when no day accumulates positive volume.
#[must_use]
pub fn amihud_measure(trades: &[Trade], now_ms: u64, period_days: u64) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }

    let period_ms = period_days.saturating_mul(MILLIS_PER_DAY);
    let mut daily: FxHashMap<u64, (f64, f64)> = FxHashMap::default();

    for pair in trades.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if now_ms.saturating_sub(curr.timestamp_ms) > period_ms {
            continue;
        }

        let day = curr.timestamp_ms / MILLIS_PER_DAY;
        let prev_day = prev.timestamp_ms / MILLIS_PER_DAY;
        if day != prev_day {
            continue;
        }

        let abs_return = (curr.price - prev.price).abs() / prev.price;
        let volume = curr.notional();
        if abs_return.is_finite() && volume.is_finite() && volume > 0.0 {
            let entry = daily.entry(day).or_insert((0.0, 0.0));
            entry.0 += abs_return;
            entry.1 += volume;
        }
    }

    let mut total = 0.0;
    let mut valid_days = 0u32;
    for (total_return, total_volume) in daily.values() {
        if *total_volume > 0.0 {
            let day_ratio = total_return / total_volume;
            if day_ratio.is_finite() {
                total += day_ratio;
                valid_days += 1;
            }
        }
    }

    if valid_days > 0 {
        total / f64::from(valid_days)
    } else {
        0.0
    }
}

/// Risk summary over the trade window's price path
///
/// Uses log returns of consecutive trade prices: sample variance with a
/// `max(1, n − 1)` divisor, VaR at the `ceil(0.05 n)` rank of the
/// ascending sort (clamped to the last index), expected shortfall as the
/// mean strictly below that rank, and historical volatility over the
/// trailing [`HISTORICAL_VOL_WINDOW`] returns when more than one exists.
#[must_use]
pub fn risk_summary(trades: &[Trade]) -> RiskSummary {
    let mut summary = RiskSummary::default();
    if trades.len() < 2 {
        return summary;
    }

    let mut returns = Vec::with_capacity(trades.len() - 1);
    for pair in trades.windows(2) {
        let log_return = (pair[1].price / pair[0].price).ln();
        if log_return.is_finite() {
            returns.push(log_return);
        }
    }
    if returns.is_empty() {
        return summary;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance =
        returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0).max(1.0);

    if variance >= 0.0 && variance.is_finite() {
        summary.realized_volatility = (variance * TRADING_HOURS_PER_YEAR).sqrt() * 100.0;
    }

    let mut sorted = returns.clone();
    sorted.sort_by(f64::total_cmp);
    let tail_index = ((sorted.len() as f64 * TAIL_QUANTILE).ceil() as usize).min(sorted.len() - 1);

    summary.var_95 = sorted[tail_index] * 100.0;

    if tail_index > 0 {
        let tail_sum: f64 = sorted[..tail_index].iter().sum();
        summary.expected_shortfall_95 = tail_sum / tail_index as f64 * 100.0;
    }

    let window = HISTORICAL_VOL_WINDOW.min(returns.len());
    if window > 1 {
        let tail = &returns[returns.len() - window..];
        let w = window as f64;
        let window_mean = tail.iter().sum::<f64>() / w;
        let window_variance = tail
            .iter()
            .map(|r| (r - window_mean) * (r - window_mean))
            .sum::<f64>()
            / (w - 1.0).max(1.0);
        if window_variance >= 0.0 && window_variance.is_finite() {
            summary.historical_volatility =
                Some((window_variance * TRADING_HOURS_PER_YEAR).sqrt() * 100.0);
        }
    }

    summary
}

/// Least-squares slope of `y` on `x`; zero for degenerate inputs
fn ols_slope(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        numerator += (xi - mean_x) * (yi - mean_y);
        denominator += (xi - mean_x) * (xi - mean_x);
    }

    if denominator != 0.0 && numerator.is_finite() && denominator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}
