//! Bounded trade history
//!
//! Sliding FIFO over validated trades. Once the configured capacity is
//! reached every push evicts the oldest entry, so memory stays flat no
//! matter how long the feed runs. Metrics read a point-in-time copy via
//! [`TradeLedger::snapshot`].

use std::collections::VecDeque;

use services_common::Trade;

/// Default number of retained trades
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded FIFO of recent trades
#[derive(Clone, Debug)]
pub struct TradeLedger {
    trades: VecDeque<Trade>,
    capacity: usize,
}

impl TradeLedger {
    /// Create a ledger with the default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a ledger retaining at most `capacity` trades (minimum 1)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            trades: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a trade, evicting oldest-first once full
    pub fn push(&mut self, trade: Trade) {
        self.trades.push_back(trade);
        while self.trades.len() > self.capacity {
            self.trades.pop_front();
        }
    }

    /// Number of retained trades
    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// True when no trades are retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Maximum number of retained trades
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Point-in-time copy, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<Trade> {
        self.trades.iter().copied().collect()
    }
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new()
    }
}
