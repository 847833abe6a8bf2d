//! Two-exchange quote tracking and crossed-market evaluation
//!
//! The monitor keeps the latest merged top-of-book per exchange and
//! evaluates the pair on every price-carrying update once both sides
//! have been seen.

use serde::{Deserialize, Serialize};
use services_common::MarketDataError;
use tracing::debug;

/// Default minimum dollar difference before a bid/ask signal fires
pub const DEFAULT_MIN_PRICE_DIFF: f64 = 1.0;
/// Default dollar edge a round trip must clear to name a direction
pub const DEFAULT_PROFIT_THRESHOLD: f64 = 0.5;

/// Tuning for the crossed-market evaluation
#[derive(Clone, Copy, Debug)]
pub struct ArbConfig {
    /// Minimum dollar difference before a bid/ask signal fires
    pub min_price_diff: f64,
    /// Dollar edge a cross-exchange round trip must exceed
    pub profit_threshold: f64,
}

impl Default for ArbConfig {
    fn default() -> Self {
        Self {
            min_price_diff: DEFAULT_MIN_PRICE_DIFF,
            profit_threshold: DEFAULT_PROFIT_THRESHOLD,
        }
    }
}

/// Partial top-of-book refresh from one exchange feed
#[derive(Clone, Debug, Deserialize)]
pub struct QuoteUpdate {
    /// Exchange the quote came from
    pub exchange: String,
    /// Best bid price, when the update carried one
    #[serde(default)]
    pub bid: Option<f64>,
    /// Size at the best bid
    #[serde(default)]
    pub bid_size: Option<f64>,
    /// Best ask price, when the update carried one
    #[serde(default)]
    pub ask: Option<f64>,
    /// Size at the best ask
    #[serde(default)]
    pub ask_size: Option<f64>,
    /// Exchange timestamp of the update
    pub timestamp_ms: u64,
}

impl QuoteUpdate {
    /// Whether the update moves a price rather than only a size
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.bid.is_some() || self.ask.is_some()
    }
}

/// Latest merged top-of-book state for one exchange
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ExchangeQuote {
    /// Best bid price
    pub bid: f64,
    /// Best ask price
    pub ask: f64,
    /// Size at the best bid
    pub bid_size: f64,
    /// Size at the best ask
    pub ask_size: f64,
    /// Timestamp of the last price-carrying update
    pub timestamp_ms: u64,
}

/// Which side of the pair to buy on
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum TradeDirection {
    /// Buy on the first exchange, sell on the second
    BuyFirst,
    /// Buy on the second exchange, sell on the first
    BuySecond,
}

/// A cross-exchange round trip worth taking
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArbEdge {
    /// Side of the pair to buy on
    pub direction: TradeDirection,
    /// Dollar edge of the round trip
    pub profit: f64,
}

/// One evaluation of the exchange pair
#[derive(Clone, Debug, Serialize)]
pub struct ArbReport {
    /// First exchange's merged quote
    pub first: ExchangeQuote,
    /// Second exchange's merged quote
    pub second: ExchangeQuote,
    /// First bid minus second bid, in dollars
    pub bid_diff: f64,
    /// First ask minus second ask, in dollars
    pub ask_diff: f64,
    /// Bid difference relative to the second exchange, in percent
    pub bid_diff_percent: f64,
    /// Ask difference relative to the second exchange, in percent
    pub ask_diff_percent: f64,
    /// Bid difference cleared the configured minimum
    pub bid_signal: bool,
    /// Ask difference cleared the configured minimum
    pub ask_signal: bool,
    /// Best round trip, when one clears the profit threshold
    pub edge: Option<ArbEdge>,
    /// Age of the stalest quote at evaluation time, in ms
    pub staleness_ms: u64,
    /// When the evaluation ran
    pub evaluated_at_ms: u64,
}

#[derive(Debug, Default)]
struct Slot {
    quote: ExchangeQuote,
    live: bool,
}

/// Tracks two exchange feeds and evaluates every effective update
#[derive(Debug)]
pub struct ArbMonitor {
    exchanges: [String; 2],
    config: ArbConfig,
    slots: [Slot; 2],
}

impl ArbMonitor {
    /// Create a monitor for the named exchange pair
    pub fn new(
        first_exchange: impl Into<String>,
        second_exchange: impl Into<String>,
        config: ArbConfig,
    ) -> Self {
        Self {
            exchanges: [first_exchange.into(), second_exchange.into()],
            config,
            slots: [Slot::default(), Slot::default()],
        }
    }

    /// Name of the first exchange in the pair
    #[must_use]
    pub fn first_exchange(&self) -> &str {
        &self.exchanges[0]
    }

    /// Name of the second exchange in the pair
    #[must_use]
    pub fn second_exchange(&self) -> &str {
        &self.exchanges[1]
    }

    /// Merge one quote update and evaluate the pair if it moved a price
    ///
    /// Size-only updates merge silently and leave the quote's age alone.
    /// Updates for exchanges outside the configured pair are rejected
    /// without touching any state. Evaluation starts once both exchanges
    /// have delivered at least one price.
    pub fn apply(
        &mut self,
        update: QuoteUpdate,
        now_ms: u64,
    ) -> Result<Option<ArbReport>, MarketDataError> {
        let index = self
            .exchanges
            .iter()
            .position(|name| name == &update.exchange)
            .ok_or_else(|| MarketDataError::UnknownExchange(update.exchange.clone()))?;

        let slot = &mut self.slots[index];
        if let Some(bid) = update.bid {
            slot.quote.bid = bid;
        }
        if let Some(size) = update.bid_size {
            slot.quote.bid_size = size;
        }
        if let Some(ask) = update.ask {
            slot.quote.ask = ask;
        }
        if let Some(size) = update.ask_size {
            slot.quote.ask_size = size;
        }
        if !update.has_price() {
            return Ok(None);
        }
        slot.quote.timestamp_ms = update.timestamp_ms;
        slot.live = true;

        if !(self.slots[0].live && self.slots[1].live) {
            debug!(exchange = %update.exchange, "waiting for the other exchange");
            return Ok(None);
        }
        Ok(Some(self.evaluate(now_ms)))
    }

    fn evaluate(&self, now_ms: u64) -> ArbReport {
        let first = self.slots[0].quote;
        let second = self.slots[1].quote;

        let bid_diff = first.bid - second.bid;
        let ask_diff = first.ask - second.ask;
        let bid_diff_percent = bid_diff / second.bid * 100.0;
        let ask_diff_percent = ask_diff / second.ask * 100.0;

        // Cross the books both ways and keep the better round trip
        let buy_second_edge = first.ask - second.bid;
        let buy_first_edge = second.ask - first.bid;
        let edge = if buy_second_edge > self.config.profit_threshold
            && buy_second_edge > buy_first_edge
        {
            Some(ArbEdge {
                direction: TradeDirection::BuySecond,
                profit: buy_second_edge,
            })
        } else if buy_first_edge > self.config.profit_threshold {
            Some(ArbEdge {
                direction: TradeDirection::BuyFirst,
                profit: buy_first_edge,
            })
        } else {
            None
        };

        let staleness_ms = now_ms
            .saturating_sub(first.timestamp_ms)
            .max(now_ms.saturating_sub(second.timestamp_ms));

        ArbReport {
            first,
            second,
            bid_diff,
            ask_diff,
            bid_diff_percent,
            ask_diff_percent,
            bid_signal: bid_diff.abs() >= self.config.min_price_diff,
            ask_signal: ask_diff.abs() >= self.config.min_price_diff,
            edge,
            staleness_ms,
            evaluated_at_ms: now_ms,
        }
    }
}
