//! Unit tests for field-map decoding, including the handoff into the router

use analytics::decode::decode_fields;
use analytics::router::{EventRouter, RouterConfig};
use rstest::rstest;
use rustc_hash::FxHashMap;
use services_common::{BookLevel, FeedEvent, Side};

fn fields(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[rstest]
#[case(Some("1"), Side::Sell)]
#[case(Some("0"), Side::Buy)]
#[case(Some("true"), Side::Buy)]
#[case(None, Side::Unknown)]
fn test_buyer_maker_side_mapping(#[case] maker: Option<&str>, #[case] expected: Side) {
    let mut map = fields(&[("LAST_PRICE", "100.0"), ("LAST_SIZE", "0.5")]);
    if let Some(value) = maker {
        map.insert("IS_BUYER_MAKER".to_string(), value.to_string());
    }

    match decode_fields(&map, 1) {
        FeedEvent::Trade { side, .. } => assert_eq!(side, expected),
        other => panic!("expected trade, got {other:?}"),
    }
}

#[test]
fn test_deep_ladder_assembles_in_index_order() {
    let mut map = FxHashMap::default();
    // Insert levels back to front so decode cannot rely on map order
    for i in (0..20usize).rev() {
        map.insert(format!("BID_PRICE_{i}"), format!("{}", 100.0 - i as f64 * 0.5));
        map.insert(format!("BID_SIZE_{i}"), "1.0".to_string());
        map.insert(format!("ASK_PRICE_{i}"), format!("{}", 100.5 + i as f64 * 0.5));
        map.insert(format!("ASK_SIZE_{i}"), "2.0".to_string());
    }

    match decode_fields(&map, 9) {
        FeedEvent::Book {
            bids,
            asks,
            timestamp_ms,
        } => {
            assert_eq!(timestamp_ms, 9);
            assert_eq!(bids.len(), 20);
            assert_eq!(asks.len(), 20);
            assert_eq!(bids[0], BookLevel::new(100.0, 1.0));
            assert_eq!(bids[19], BookLevel::new(90.5, 1.0));
            assert_eq!(asks[0], BookLevel::new(100.5, 2.0));
        }
        other => panic!("expected book, got {other:?}"),
    }
}

#[test]
fn test_junk_trade_fields_are_rejected_downstream() {
    let router = EventRouter::new(RouterConfig::default());
    let event = decode_fields(
        &fields(&[("LAST_PRICE", "not-a-number"), ("LAST_SIZE", "1.0")]),
        1,
    );

    // Decoding defaults the field to zero; validation then rejects it
    assert!(router.on_event(event).is_err());
    assert_eq!(router.stats().rejected, 1);
}

#[test]
fn test_sparse_book_levels_filtered_by_the_cache() {
    let router = EventRouter::new(RouterConfig::default());
    // Price-only entries decode as zero-size levels
    let event = decode_fields(
        &fields(&[
            ("BID_PRICE_0", "100.0"),
            ("BID_SIZE_0", "1.0"),
            ("BID_PRICE_1", "99.5"),
            ("ASK_PRICE_0", "100.5"),
            ("ASK_SIZE_0", "0.75"),
        ]),
        1,
    );

    router.on_event(event).unwrap();
    let metrics = router.analyze_now(1);
    // The size-less bid level never reaches the depth sums
    assert_eq!(metrics.bid_depth, 1.0);
    assert_eq!(metrics.ask_depth, 0.75);
}

#[test]
fn test_empty_map_is_unknown() {
    assert!(matches!(
        decode_fields(&FxHashMap::default(), 0),
        FeedEvent::Unknown
    ));
}
