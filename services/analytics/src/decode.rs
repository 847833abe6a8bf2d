//! Field-map decoding for feed messages
//!
//! Upstream sessions deliver flat name/value maps. Classification is by
//! schema: trade maps carry `LAST_PRICE`/`LAST_SIZE`, depth maps carry
//! indexed `BID_PRICE_<i>`/`ASK_PRICE_<i>` style keys (trade keys win
//! when both appear). Unparseable values skip that field only; trade
//! validation happens later at [`services_common::Trade::new`].

use rustc_hash::FxHashMap;
use services_common::{BookLevel, FeedEvent, Side};

/// Highest book level index the decoder will materialize
pub const MAX_LEVEL_INDEX: usize = 256;

/// Classify and decode one field map into a feed event
#[must_use]
pub fn decode_fields(fields: &FxHashMap<String, String>, timestamp_ms: u64) -> FeedEvent {
    if fields.contains_key("LAST_PRICE") || fields.contains_key("LAST_SIZE") {
        return decode_trade(fields, timestamp_ms);
    }
    if fields
        .keys()
        .any(|k| k.contains("BID_PRICE") || k.contains("ASK_PRICE"))
    {
        return decode_book(fields, timestamp_ms);
    }
    FeedEvent::Unknown
}

fn decode_trade(fields: &FxHashMap<String, String>, timestamp_ms: u64) -> FeedEvent {
    let price = parse_field(fields, "LAST_PRICE");
    let size = parse_field(fields, "LAST_SIZE");

    // Maker-side buyer means the aggressor sold
    let side = match fields.get("IS_BUYER_MAKER").map(String::as_str) {
        Some("1") => Side::Sell,
        Some(_) => Side::Buy,
        None => Side::Unknown,
    };

    FeedEvent::Trade {
        price,
        size,
        side,
        timestamp_ms,
    }
}

fn decode_book(fields: &FxHashMap<String, String>, timestamp_ms: u64) -> FeedEvent {
    let mut bids: Vec<BookLevel> = Vec::new();
    let mut asks: Vec<BookLevel> = Vec::new();

    for (key, value) in fields {
        let Ok(parsed) = value.parse::<f64>() else {
            continue;
        };

        if let Some(index) = level_index(key, "BID_PRICE_") {
            ensure_level(&mut bids, index).price = parsed;
        } else if let Some(index) = level_index(key, "BID_SIZE_") {
            ensure_level(&mut bids, index).size = parsed;
        } else if let Some(index) = level_index(key, "ASK_PRICE_") {
            ensure_level(&mut asks, index).price = parsed;
        } else if let Some(index) = level_index(key, "ASK_SIZE_") {
            ensure_level(&mut asks, index).size = parsed;
        }
    }

    FeedEvent::Book {
        bids,
        asks,
        timestamp_ms,
    }
}

fn parse_field(fields: &FxHashMap<String, String>, key: &str) -> f64 {
    fields.get(key).and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

fn level_index(key: &str, prefix: &str) -> Option<usize> {
    let index: usize = key.strip_prefix(prefix)?.parse().ok()?;
    (index <= MAX_LEVEL_INDEX).then_some(index)
}

fn ensure_level(side: &mut Vec<BookLevel>, index: usize) -> &mut BookLevel {
    if side.len() <= index {
        side.resize(index + 1, BookLevel::default());
    }
    &mut side[index]
}
