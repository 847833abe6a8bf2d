//! Canonical market data types for trades and order book snapshots

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Aggressor side of a trade
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buyer was the aggressor
    Buy,
    /// Seller was the aggressor
    Sell,
    /// Aggressor not reported by the feed
    #[default]
    Unknown,
}

impl Side {
    /// Signed unit for flow-signing traded volume
    #[must_use]
    pub const fn signed_unit(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
            Self::Unknown => 0.0,
        }
    }
}

/// A validated trade print
///
/// Construction is the validation boundary: a `Trade` always carries a
/// positive price and size. Deliberately not `Deserialize`; raw feed
/// fields travel as [`FeedEvent::Trade`] until validated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trade {
    /// Execution price
    pub price: f64,
    /// Executed base quantity
    pub size: f64,
    /// Aggressor side
    pub side: Side,
    /// Exchange timestamp in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl Trade {
    /// Create a trade, rejecting non-positive (or NaN) price or size
    pub fn new(
        price: f64,
        size: f64,
        side: Side,
        timestamp_ms: u64,
    ) -> Result<Self, MarketDataError> {
        if price > 0.0 && size > 0.0 {
            Ok(Self {
                price,
                size,
                side,
                timestamp_ms,
            })
        } else {
            Err(MarketDataError::InvalidTrade { price, size })
        }
    }

    /// Notional value in quote currency
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// One price level of an order book side
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Level price
    pub price: f64,
    /// Resting quantity at the level
    pub size: f64,
}

impl BookLevel {
    /// Create a price level
    #[must_use]
    pub const fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }

    /// Levels with non-positive price or size carry no liquidity
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.price > 0.0 && self.size > 0.0
    }

    /// Notional resting at the level
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// One decoded feed event
///
/// The wire shape for replay files and the output of the field-map
/// decoder. Trade fields are raw here; [`Trade::new`] validates them at
/// ingestion.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A trade print
    Trade {
        /// Execution price as reported
        price: f64,
        /// Executed base quantity as reported
        size: f64,
        /// Aggressor side, unknown when the feed omits it
        #[serde(default)]
        side: Side,
        /// Exchange timestamp in milliseconds
        timestamp_ms: u64,
    },
    /// A depth snapshot
    Book {
        /// Bid levels, any order on the wire
        #[serde(default)]
        bids: Vec<BookLevel>,
        /// Ask levels, any order on the wire
        #[serde(default)]
        asks: Vec<BookLevel>,
        /// Exchange timestamp in milliseconds
        timestamp_ms: u64,
    },
    /// Anything the decoder could not classify
    Unknown,
}
