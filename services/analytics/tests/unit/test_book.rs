//! Unit tests for the order book cache

use analytics::book::OrderBookCache;
use services_common::BookLevel;

use crate::assertions::assert_book_invariants;
use crate::generators::ladder;

#[test]
fn test_invalid_levels_are_dropped() {
    let mut cache = OrderBookCache::new();
    cache.update(
        vec![
            BookLevel::new(100.0, 1.0),
            BookLevel::new(0.0, 5.0),
            BookLevel::new(99.0, 0.0),
            BookLevel::new(-1.0, 2.0),
            BookLevel::new(f64::NAN, 2.0),
            BookLevel::new(98.5, f64::NAN),
        ],
        vec![BookLevel::new(100.5, 2.0), BookLevel::new(101.0, -3.0)],
        1,
    );

    let snap = cache.snapshot();
    assert_eq!(snap.bids, vec![BookLevel::new(100.0, 1.0)]);
    assert_eq!(snap.asks, vec![BookLevel::new(100.5, 2.0)]);
    assert_book_invariants(snap);
}

#[test]
fn test_unsorted_input_comes_back_sorted() {
    let mut cache = OrderBookCache::new();
    cache.update(
        vec![
            BookLevel::new(98.0, 1.0),
            BookLevel::new(100.0, 1.0),
            BookLevel::new(99.0, 1.0),
        ],
        vec![
            BookLevel::new(103.0, 1.0),
            BookLevel::new(101.0, 1.0),
            BookLevel::new(102.0, 1.0),
        ],
        1,
    );

    let snap = cache.snapshot();
    assert_eq!(snap.best_bid().map(|l| l.price), Some(100.0));
    assert_eq!(snap.best_ask().map(|l| l.price), Some(101.0));
    assert_book_invariants(snap);
}

#[test]
fn test_update_replaces_rather_than_merges() {
    let mut cache = OrderBookCache::new();
    cache.update(ladder(true, 100.0, 5), ladder(false, 100.5, 5), 1);
    cache.update(vec![BookLevel::new(90.0, 1.0)], vec![], 2);

    let snap = cache.snapshot();
    assert_eq!(snap.bids.len(), 1);
    assert_eq!(snap.bids[0].price, 90.0);
    assert!(snap.asks.is_empty());
    assert_eq!(snap.timestamp_ms, 2);
}

#[test]
fn test_one_sided_and_empty_books() {
    let mut cache = OrderBookCache::new();
    cache.update(ladder(true, 100.0, 3), vec![], 1);

    let snap = cache.snapshot();
    assert!(snap.best_bid().is_some());
    assert!(snap.best_ask().is_none());
    assert!(!snap.is_two_sided());

    cache.update(vec![], vec![], 2);
    let snap = cache.snapshot();
    assert!(snap.best_bid().is_none());
    assert!(snap.best_ask().is_none());
    assert!(!snap.is_two_sided());
}

#[test]
fn test_all_invalid_update_clears_the_side() {
    let mut cache = OrderBookCache::new();
    cache.update(ladder(true, 100.0, 3), ladder(false, 100.5, 3), 1);
    cache.update(
        vec![BookLevel::new(0.0, 1.0), BookLevel::new(-5.0, 1.0)],
        ladder(false, 101.0, 2),
        2,
    );

    let snap = cache.snapshot();
    assert!(snap.bids.is_empty());
    assert_eq!(snap.asks.len(), 2);
}
