//! End-to-end tests for the event router

use analytics::router::{EventRouter, RouterConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use services_common::{BookLevel, FeedEvent, Side};

use crate::generators::ladder;
use crate::utils::BASE_TS_MS;

fn trade_event(price: f64, size: f64, offset_ms: u64) -> FeedEvent {
    FeedEvent::Trade {
        price,
        size,
        side: Side::Buy,
        timestamp_ms: BASE_TS_MS + offset_ms,
    }
}

fn book_event(offset_ms: u64) -> FeedEvent {
    FeedEvent::Book {
        bids: ladder(true, 49_999.5, 10),
        asks: ladder(false, 50_000.5, 10),
        timestamp_ms: BASE_TS_MS + offset_ms,
    }
}

#[test]
fn test_pipeline_produces_analysis_on_the_interval() {
    let router = EventRouter::new(RouterConfig::default());
    router.on_event(book_event(0)).unwrap();

    for i in 0..99u64 {
        let outcome = router
            .on_event(trade_event(50_000.0 + (i % 7) as f64, 0.1, i * 100))
            .unwrap();
        assert!(outcome.analysis.is_none());
        assert!(outcome.anomalies.is_some());
    }

    let outcome = router
        .on_event(trade_event(50_000.0, 0.1, 9_900))
        .unwrap();
    let analysis = outcome.analysis.expect("100th accepted trade triggers");

    // Book state flows into the triggered analysis
    assert!(analysis.spread > 0.0);
    assert!(analysis.relative_spread.is_some());
    assert!(analysis.realized_volatility > 0.0);
    assert_eq!(router.stats().analyses, 1);
}

#[test]
fn test_interval_counts_only_accepted_trades() {
    let config = RouterConfig {
        analysis_interval: 5,
        ..RouterConfig::default()
    };
    let router = EventRouter::new(config);

    for i in 0..4u64 {
        let outcome = router.on_event(trade_event(100.0, 1.0, i)).unwrap();
        assert!(outcome.analysis.is_none());
    }

    // Rejected trades and book updates do not advance the interval
    assert!(router.on_event(trade_event(-1.0, 1.0, 4)).is_err());
    router.on_event(book_event(5)).unwrap();

    let outcome = router.on_event(trade_event(100.0, 1.0, 6)).unwrap();
    assert!(outcome.analysis.is_some());
}

#[test]
fn test_counters_partition_the_event_stream() {
    let router = EventRouter::new(RouterConfig::default());

    router.on_event(trade_event(100.0, 1.0, 0)).unwrap();
    router.on_event(trade_event(101.0, 1.0, 1)).unwrap();
    let _ = router.on_event(trade_event(0.0, 1.0, 2));
    let _ = router.on_event(trade_event(100.0, -3.0, 3));
    router.on_event(book_event(4)).unwrap();
    router.on_event(FeedEvent::Unknown).unwrap();

    let stats = router.stats();
    assert_eq!(stats.trades, 2);
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.books, 1);
    assert_eq!(stats.unknown, 1);
    assert_eq!(stats.analyses, 0);
}

#[test]
fn test_rejected_trade_leaves_detector_untouched() {
    let router = EventRouter::new(RouterConfig::default());
    router.on_event(trade_event(100.0, 1.0, 0)).unwrap();
    let before = router.detector_stats();

    let _ = router.on_event(trade_event(f64::NAN, 1.0, 1));

    assert_eq!(router.detector_stats(), before);
    assert_eq!(router.detector_stats().trades_seen, 1);
}

#[test]
fn test_analyze_now_works_mid_interval() {
    let router = EventRouter::new(RouterConfig::default());
    for i in 0..10u64 {
        router
            .on_event(trade_event(100.0 + (i % 3) as f64, 0.5, i * 1000))
            .unwrap();
    }

    let metrics = router.analyze_now(BASE_TS_MS + 10_000);
    assert!(metrics.realized_volatility > 0.0);
    // On-demand analysis does not count as an interval trigger
    assert_eq!(router.stats().analyses, 0);
}

#[test]
fn test_concurrent_ingestion_keeps_counters_consistent() {
    let router = EventRouter::new(RouterConfig::default());

    std::thread::scope(|scope| {
        for worker in 0..4u64 {
            let router = &router;
            scope.spawn(move || {
                let mut rng = StdRng::seed_from_u64(worker);
                for i in 0..50u64 {
                    let price = 50_000.0 + rng.gen_range(-5.0..5.0);
                    let size = rng.gen_range(0.01..0.5);
                    let event = FeedEvent::Trade {
                        price,
                        size,
                        side: Side::Buy,
                        timestamp_ms: BASE_TS_MS + worker * 1000 + i,
                    };
                    router.on_event(event).unwrap();
                }
            });
        }
    });

    let stats = router.stats();
    assert_eq!(stats.trades, 200);
    assert_eq!(stats.rejected, 0);
    // 200 accepted trades cross the default interval of 100 exactly twice
    assert_eq!(stats.analyses, 2);
    assert_eq!(router.detector_stats().trades_seen, 200);
}

#[test]
fn test_book_only_stream_supports_on_demand_analysis() {
    let router = EventRouter::new(RouterConfig::default());
    router
        .on_event(FeedEvent::Book {
            bids: vec![BookLevel::new(100.0, 2.0)],
            asks: vec![BookLevel::new(100.5, 2.0)],
            timestamp_ms: BASE_TS_MS,
        })
        .unwrap();

    let metrics = router.analyze_now(BASE_TS_MS);
    assert_eq!(metrics.spread, 0.5);
    assert_eq!(metrics.realized_volatility, 0.0);
}
