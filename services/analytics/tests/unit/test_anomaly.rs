//! Scenario tests for the streaming anomaly detector

use analytics::anomaly::{AnomalyConfig, AnomalyDetector, DEFAULT_WINDOW};

use crate::utils::trade_at;

/// Feed a quiet tape: tiny sizes, prices wiggling a few ticks
fn warmed_up_detector(trades: usize) -> AnomalyDetector {
    let mut detector = AnomalyDetector::default();
    for i in 0..trades {
        let wiggle = f64::from(i as u32 % 3) * 0.05;
        detector.on_trade(&trade_at(100.0 + wiggle, 0.2, i as u64 * 100));
    }
    detector
}

#[test]
fn test_size_burst_on_a_quiet_tape() {
    let mut detector = warmed_up_detector(30);
    let flags = detector.on_trade(&trade_at(100.0, 5.0, 10_000));

    assert!(flags.size);
    assert!(!flags.price);
    assert!(!flags.volatility);
}

#[test]
fn test_price_spike_on_a_quiet_tape() {
    let mut detector = warmed_up_detector(30);
    // A 2.0 move against average deviations near 0.05
    let flags = detector.on_trade(&trade_at(102.0, 0.2, 10_000));

    assert!(flags.price);
    assert!(!flags.size);
}

#[test]
fn test_huge_first_trade_only_seeds() {
    let mut detector = AnomalyDetector::default();
    let flags = detector.on_trade(&trade_at(100.0, 500.0, 0));
    assert!(!flags.any());

    // The follow-up small print is judged on its own merits
    let flags = detector.on_trade(&trade_at(100.0, 0.1, 100));
    assert!(!flags.size);
}

#[test]
fn test_volatility_alarm_decays_on_quiet_trades() {
    let mut detector = AnomalyDetector::default();
    detector.on_trade(&trade_at(100.0, 0.1, 0));
    let flags = detector.on_trade(&trade_at(110.0, 0.1, 100));
    assert!(flags.volatility);

    // Flat prices decay the EWMA variance back under the alarm level
    let mut last = flags;
    for i in 0..12u64 {
        last = detector.on_trade(&trade_at(110.0, 0.1, 200 + i * 100));
    }
    assert!(!last.volatility);
}

#[test]
fn test_adaptive_size_threshold_tracks_the_tape() {
    // Institutional-size tape: the 90th percentile sits far above the floor
    let mut detector = AnomalyDetector::default();
    for i in 0..20u64 {
        let size = 10.0 + f64::from(i as u32 % 10);
        detector.on_trade(&trade_at(100.0, size, i * 100));
    }

    let stats = detector.stats();
    assert!(stats.size_threshold > 1.0);

    // A size below the adapted threshold and below 3x average stays clear
    let flags = detector.on_trade(&trade_at(100.0, 12.0, 5_000));
    assert!(!flags.size);

    // Well beyond the adapted threshold
    let flags = detector.on_trade(&trade_at(100.0, 60.0, 5_100));
    assert!(flags.size);
}

#[test]
fn test_stats_checkpoints_over_a_stream() {
    let mut detector = AnomalyDetector::default();
    let mut checkpoints = 0;
    for i in 0..200u64 {
        detector.on_trade(&trade_at(100.0, 0.2, i * 100));
        if AnomalyDetector::is_stats_checkpoint(detector.trades_seen()) {
            checkpoints += 1;
        }
    }
    // Trades 20, 50, 100, 150, and 200
    assert_eq!(checkpoints, 5);
}

#[test]
fn test_window_occupancy_caps_at_configured_length() {
    let detector = warmed_up_detector(DEFAULT_WINDOW * 3);
    let stats = detector.stats();
    assert_eq!(stats.window_len, DEFAULT_WINDOW);
    assert_eq!(stats.trades_seen, DEFAULT_WINDOW as u64 * 3);
}

#[test]
fn test_custom_window_config() {
    let config = AnomalyConfig {
        window: 5,
        min_samples: 3,
        ..AnomalyConfig::default()
    };
    let mut detector = AnomalyDetector::new(config);
    for i in 0..10u64 {
        detector.on_trade(&trade_at(100.0, 0.2, i * 100));
    }
    assert_eq!(detector.stats().window_len, 5);
}
