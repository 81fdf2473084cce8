//! Loosely typed wire shapes for the public API.
//!
//! Every endpoint wraps its payload in the same two-field envelope: an
//! `error` array of strings and an endpoint-shaped `result`. Endpoints whose
//! result mixes a `last` cursor into the same object as the per-pair series
//! decode into [`serde_json::Value`] and are reshaped positionally by the
//! codec.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The common response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de> + Default"))]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub result: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTime {
    #[serde(default)]
    pub unixtime: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSystemStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Asset record. The asset's name is the map key, not part of the record.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAsset {
    #[serde(default)]
    pub aclass: String,
    #[serde(default)]
    pub altname: String,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub display_decimals: u32,
}

/// Asset-pair record. `fees`/`fees_maker` are positional
/// `[volume, percentage]` pairs.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAssetPair {
    #[serde(default)]
    pub altname: String,
    #[serde(default)]
    pub wsname: String,
    #[serde(default)]
    pub aclass_base: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub aclass_quote: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub lot: String,
    #[serde(default)]
    pub pair_decimals: u32,
    #[serde(default)]
    pub lot_decimals: u32,
    #[serde(default)]
    pub lot_multiplier: u32,
    #[serde(default)]
    pub leverage_buy: Vec<u32>,
    #[serde(default)]
    pub leverage_sell: Vec<u32>,
    #[serde(default)]
    pub fees: Vec<Vec<f64>>,
    #[serde(default)]
    pub fees_maker: Vec<Vec<f64>>,
    #[serde(default)]
    pub fee_volume_currency: String,
    #[serde(default)]
    pub margin_call: u32,
    #[serde(default)]
    pub margin_stop: u32,
    #[serde(default)]
    pub ordermin: f64,
}

/// Ticker record: single-letter keys, short positional arrays of
/// decimal-precision strings, except `t` (trade counts) and the bare `o`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTicker {
    #[serde(default, rename = "a")]
    pub ask: Vec<String>,
    #[serde(default, rename = "b")]
    pub bid: Vec<String>,
    #[serde(default, rename = "c")]
    pub last_close: Vec<String>,
    #[serde(default, rename = "v")]
    pub volume: Vec<String>,
    #[serde(default, rename = "p")]
    pub vwap: Vec<String>,
    #[serde(default, rename = "t")]
    pub trade_count: Vec<u64>,
    #[serde(default, rename = "l")]
    pub low: Vec<String>,
    #[serde(default, rename = "h")]
    pub high: Vec<String>,
    #[serde(default, rename = "o")]
    pub open: String,
}

/// Order-book sides: rows of `[price, volume, time]`, all native numbers.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDepth {
    #[serde(default)]
    pub asks: Vec<Vec<Value>>,
    #[serde(default)]
    pub bids: Vec<Vec<Value>>,
}

/// Result shape of the cursor-bearing series endpoints (OHLC, trades,
/// spreads): pair keys map to row arrays, the reserved `last` key holds the
/// cursor.
pub(crate) type RawSeries = HashMap<String, Value>;
