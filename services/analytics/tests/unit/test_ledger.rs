//! Unit tests for the bounded trade ledger

use analytics::ledger::{TradeLedger, DEFAULT_CAPACITY};

use crate::utils::trade_at;

#[test]
fn test_default_capacity_is_enforced() {
    let mut ledger = TradeLedger::new();
    assert_eq!(ledger.capacity(), DEFAULT_CAPACITY);

    for i in 0..(DEFAULT_CAPACITY as u64 + 50) {
        ledger.push(trade_at(100.0, 1.0, i));
    }

    assert_eq!(ledger.len(), DEFAULT_CAPACITY);
    let snap = ledger.snapshot();
    // The 50 oldest trades fell off the front
    assert_eq!(snap[0].timestamp_ms, crate::utils::BASE_TS_MS + 50);
    assert_eq!(
        snap.last().unwrap().timestamp_ms,
        crate::utils::BASE_TS_MS + DEFAULT_CAPACITY as u64 + 49
    );
}

#[test]
fn test_snapshot_is_isolated_from_later_pushes() {
    let mut ledger = TradeLedger::with_capacity(16);
    ledger.push(trade_at(100.0, 1.0, 0));
    ledger.push(trade_at(101.0, 1.0, 1));

    let snap = ledger.snapshot();
    ledger.push(trade_at(102.0, 1.0, 2));

    assert_eq!(snap.len(), 2);
    assert_eq!(ledger.len(), 3);
    assert_eq!(snap[1].price, 101.0);
}

#[test]
fn test_insertion_order_is_preserved() {
    let mut ledger = TradeLedger::with_capacity(8);
    for (i, price) in [103.0, 101.0, 104.0, 102.0].iter().enumerate() {
        ledger.push(trade_at(*price, 1.0, i as u64));
    }

    let prices: Vec<f64> = ledger.snapshot().iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![103.0, 101.0, 104.0, 102.0]);
}
