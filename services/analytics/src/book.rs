//! Order book snapshot cache
//!
//! Holds the latest depth snapshot for one instrument. Updates replace the
//! whole snapshot: levels that fail validation are dropped, bids sort
//! descending and asks ascending, so index 0 is always the best level on
//! either side.

use services_common::BookLevel;
use tracing::debug;

/// Immutable bid/ask snapshot, best level first on both sides
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookSnapshot {
    /// Bids in descending price order
    pub bids: Vec<BookLevel>,
    /// Asks in ascending price order
    pub asks: Vec<BookLevel>,
    /// Exchange timestamp of the snapshot in milliseconds
    pub timestamp_ms: u64,
}

impl BookSnapshot {
    /// Best bid, if the bid side is non-empty
    #[must_use]
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    /// Best ask, if the ask side is non-empty
    #[must_use]
    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// True when both sides have at least one level
    #[must_use]
    pub fn is_two_sided(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }
}

/// Latest-snapshot cache with validity filtering
#[derive(Clone, Debug, Default)]
pub struct OrderBookCache {
    snapshot: BookSnapshot,
}

impl OrderBookCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached snapshot with freshly filtered, sorted sides
    pub fn update(&mut self, bids: Vec<BookLevel>, asks: Vec<BookLevel>, timestamp_ms: u64) {
        let raw_levels = bids.len() + asks.len();

        let mut bids: Vec<BookLevel> = bids.into_iter().filter(BookLevel::is_valid).collect();
        let mut asks: Vec<BookLevel> = asks.into_iter().filter(BookLevel::is_valid).collect();
        bids.sort_by(|a, b| b.price.total_cmp(&a.price));
        asks.sort_by(|a, b| a.price.total_cmp(&b.price));

        let kept = bids.len() + asks.len();
        if kept < raw_levels {
            debug!(dropped = raw_levels - kept, "Dropped invalid book levels");
        }

        self.snapshot = BookSnapshot {
            bids,
            asks,
            timestamp_ms,
        };
    }

    /// Current snapshot
    #[must_use]
    pub const fn snapshot(&self) -> &BookSnapshot {
        &self.snapshot
    }
}
