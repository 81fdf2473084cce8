//! Response codec for the public market-data endpoints.
//!
//! This is the normalization layer between the exchange's loosely typed JSON
//! and the crate's domain model. Every payload arrives in the same envelope
//! (`error` array plus endpoint-shaped `result`), but the result shapes are
//! irregular: maps keyed by pair name with a reserved `last` cursor key mixed
//! in, short positional arrays whose element types vary by slot, decimal
//! numbers encoded as strings on some endpoints and as native numbers on
//! others, and cursors that arrive float-shaped or as wide integer strings
//! depending on the endpoint.
//!
//! [`parse`] dispatches on the destination type: each of the nine result
//! types implements the sealed [`ParseResponse`] trait, so the caller states
//! which decoder runs by choosing `T` and unsupported targets are rejected at
//! compile time. Structural problems abort the decode with
//! [`ExchangeError::MalformedPayload`]; error strings reported by the API
//! itself are classified and attached to the result as data.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use crate::core::errors::{ApiError, ApiErrorKind, ExchangeError};
use crate::core::types::{
    Asset, AssetPair, AssetPairs, Assets, AskBid, FeeTier, LastClose, Ohlc, Ohlcs, OrderAction,
    OrderBook, OrderType, RecentSpreads, RecentTrade, RecentTrades, ServerTime, Spread,
    SystemStatus, Ticker, Tickers,
};
use crate::kraken::types::{
    Envelope, RawAsset, RawAssetPair, RawDepth, RawSeries, RawSystemStatus, RawTicker, RawTime,
};

/// Reserved key carrying the incremental-polling cursor in series results.
const CURSOR_KEY: &str = "last";

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::core::types::ServerTime {}
    impl Sealed for crate::core::types::SystemStatus {}
    impl Sealed for crate::core::types::Assets {}
    impl Sealed for crate::core::types::AssetPairs {}
    impl Sealed for crate::core::types::Tickers {}
    impl Sealed for crate::core::types::Ohlcs {}
    impl Sealed for crate::core::types::OrderBook {}
    impl Sealed for crate::core::types::RecentTrades {}
    impl Sealed for crate::core::types::RecentSpreads {}
}

/// A response type the codec knows how to decode.
///
/// Sealed: exactly the nine public market-data results implement it. The
/// decoder is selected by the destination type, not by inspecting the
/// payload; the caller already knows which endpoint it hit.
pub trait ParseResponse: sealed::Sealed + Sized {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError>;
}

/// Decode a raw public-API payload into its typed result.
///
/// On a malformed payload the error carries the failing detail and no value
/// is produced; in-band API errors never fail the call and are returned on
/// the result's `errors` field instead.
pub fn parse<T: ParseResponse>(payload: &[u8]) -> Result<T, ExchangeError> {
    T::from_payload(payload)
}

impl ParseResponse for ServerTime {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_server_time(payload)
    }
}

impl ParseResponse for SystemStatus {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_system_status(payload)
    }
}

impl ParseResponse for Assets {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_assets(payload)
    }
}

impl ParseResponse for AssetPairs {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_asset_pairs(payload)
    }
}

impl ParseResponse for Tickers {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_tickers(payload)
    }
}

impl ParseResponse for Ohlcs {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_ohlcs(payload)
    }
}

impl ParseResponse for OrderBook {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_order_book(payload)
    }
}

impl ParseResponse for RecentTrades {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_recent_trades(payload)
    }
}

impl ParseResponse for RecentSpreads {
    fn from_payload(payload: &[u8]) -> Result<Self, ExchangeError> {
        parse_recent_spreads(payload)
    }
}

fn malformed(detail: impl std::fmt::Display) -> ExchangeError {
    ExchangeError::MalformedPayload(detail.to_string())
}

fn decode_envelope<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ExchangeError> {
    serde_json::from_slice(payload).map_err(malformed)
}

/// Classify the API's in-band error strings.
///
/// Each entry splits on the first colon; a recognized category token yields
/// that category with the remainder as message, anything else keeps the full
/// original string under [`ApiErrorKind::Unknown`]. Order and length are
/// preserved. An empty input stays absent so "no errors" compares equal
/// across responses.
fn classify_errors(raw: &[String]) -> Option<Vec<ApiError>> {
    if raw.is_empty() {
        return None;
    }

    let errors = raw
        .iter()
        .map(|entry| match entry.split_once(':') {
            Some((prefix, message)) => match ApiErrorKind::from_wire_prefix(prefix) {
                Some(kind) => ApiError {
                    kind,
                    message: message.to_string(),
                },
                None => ApiError {
                    kind: ApiErrorKind::Unknown,
                    message: entry.clone(),
                },
            },
            None => ApiError {
                kind: ApiErrorKind::Unknown,
                message: entry.clone(),
            },
        })
        .collect();

    Some(errors)
}

/// Exact decimal from a wire string; no binary-float intermediate.
fn decimal_str(s: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(s).map_err(|e| malformed(format!("invalid decimal {:?}: {}", s, e)))
}

/// Decimal from a native wire number, accepting f64 precision; some
/// endpoints never provide a string form.
fn decimal_f64(value: f64) -> Result<Decimal, ExchangeError> {
    Decimal::from_f64(value).ok_or_else(|| malformed(format!("unrepresentable number {}", value)))
}

fn epoch(secs: i64) -> Result<DateTime<Utc>, ExchangeError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| malformed(format!("timestamp {} out of range", secs)))
}

fn slot<'a>(row: &'a [Value], idx: usize) -> Result<&'a Value, ExchangeError> {
    row.get(idx).ok_or_else(|| {
        malformed(format!(
            "row has {} elements, expected at least {}",
            row.len(),
            idx + 1
        ))
    })
}

fn str_slot<'a>(row: &'a [Value], idx: usize) -> Result<&'a str, ExchangeError> {
    slot(row, idx)?
        .as_str()
        .ok_or_else(|| malformed(format!("expected a string at position {}", idx)))
}

fn f64_slot(row: &[Value], idx: usize) -> Result<f64, ExchangeError> {
    slot(row, idx)?
        .as_f64()
        .ok_or_else(|| malformed(format!("expected a number at position {}", idx)))
}

/// Unsigned integer at a positional slot; integral wire numbers read
/// exactly, float-shaped ones truncate.
fn u64_slot(row: &[Value], idx: usize) -> Result<u64, ExchangeError> {
    let value = slot(row, idx)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    value
        .as_f64()
        .map(|f| f.trunc() as u64)
        .ok_or_else(|| malformed(format!("expected a number at position {}", idx)))
}

/// Epoch-seconds instant at a positional slot; fractional seconds truncate.
fn epoch_slot(row: &[Value], idx: usize) -> Result<DateTime<Utc>, ExchangeError> {
    let value = slot(row, idx)?;
    let secs = if let Some(s) = value.as_i64() {
        s
    } else if let Some(f) = value.as_f64() {
        f.trunc() as i64
    } else {
        return Err(malformed(format!("expected a timestamp at position {}", idx)));
    };
    epoch(secs)
}

/// Cursor supplied as a JSON number. Float-shaped values truncate to their
/// integer part; exact for anything representable in a double.
fn numeric_cursor(value: &Value) -> Result<u64, ExchangeError> {
    if let Some(id) = value.as_u64() {
        return Ok(id);
    }
    value
        .as_f64()
        .map(|f| f.trunc() as u64)
        .ok_or_else(|| malformed(format!("cursor is not numeric: {}", value)))
}

/// Cursor supplied as a decimal string. These exceed 53-bit float precision,
/// so the digits parse straight to u64.
fn string_cursor(value: &Value) -> Result<u64, ExchangeError> {
    let digits = value
        .as_str()
        .ok_or_else(|| malformed(format!("cursor is not a string: {}", value)))?;
    digits
        .parse::<u64>()
        .map_err(|e| malformed(format!("invalid cursor {:?}: {}", digits, e)))
}

fn parse_server_time(payload: &[u8]) -> Result<ServerTime, ExchangeError> {
    let msg: Envelope<RawTime> = decode_envelope(payload)?;

    Ok(ServerTime {
        errors: classify_errors(&msg.error),
        timestamp: epoch(msg.result.unixtime)?,
    })
}

fn parse_system_status(payload: &[u8]) -> Result<SystemStatus, ExchangeError> {
    let msg: Envelope<RawSystemStatus> = decode_envelope(payload)?;

    // This endpoint is the one place the wire uses RFC 3339 text instead of
    // epoch seconds; an unparseable timestamp is a malformed payload, not a
    // default.
    let timestamp = DateTime::parse_from_rfc3339(&msg.result.timestamp)
        .map_err(|e| malformed(format!("invalid timestamp {:?}: {}", msg.result.timestamp, e)))?
        .with_timezone(&Utc);

    Ok(SystemStatus {
        errors: classify_errors(&msg.error),
        status: msg.result.status,
        timestamp,
    })
}

fn parse_assets(payload: &[u8]) -> Result<Assets, ExchangeError> {
    let msg: Envelope<HashMap<String, RawAsset>> = decode_envelope(payload)?;

    let assets = msg
        .result
        .into_iter()
        .map(|(name, raw)| {
            let asset = Asset {
                // the record omits its own name; inject the map key
                name: name.clone(),
                class: raw.aclass,
                alt_name: raw.altname,
                precision: raw.decimals,
                display_precision: raw.display_decimals,
            };
            (name, asset)
        })
        .collect();

    Ok(Assets {
        errors: classify_errors(&msg.error),
        assets,
    })
}

fn parse_asset_pairs(payload: &[u8]) -> Result<AssetPairs, ExchangeError> {
    let msg: Envelope<HashMap<String, RawAssetPair>> = decode_envelope(payload)?;

    let mut pairs = HashMap::with_capacity(msg.result.len());
    for (name, raw) in msg.result {
        let pair = AssetPair {
            alt_name: raw.altname,
            websocket_name: raw.wsname,
            asset_class_base: raw.aclass_base,
            base: raw.base,
            asset_class_quote: raw.aclass_quote,
            quote: raw.quote,
            lot: raw.lot,
            pair_precision: raw.pair_decimals,
            lot_precision: raw.lot_decimals,
            lot_multiplier: raw.lot_multiplier,
            leverage_buy: raw.leverage_buy,
            leverage_sell: raw.leverage_sell,
            fees_taker: parse_fee_tiers(&raw.fees)?,
            fees_maker: parse_fee_tiers(&raw.fees_maker)?,
            fee_volume_currency: raw.fee_volume_currency,
            margin_call: raw.margin_call,
            margin_stop: raw.margin_stop,
            order_min: decimal_f64(raw.ordermin)?,
        };
        pairs.insert(name, pair);
    }

    Ok(AssetPairs {
        errors: classify_errors(&msg.error),
        pairs,
    })
}

/// Fee ladders arrive as `[volume, percentage]` pairs; the volume threshold
/// truncates to an integer, the percentage keeps its fraction. Wire order is
/// ascending by volume and is preserved.
fn parse_fee_tiers(tiers: &[Vec<f64>]) -> Result<Vec<FeeTier>, ExchangeError> {
    tiers
        .iter()
        .map(|tier| {
            let volume = tier
                .first()
                .ok_or_else(|| malformed("fee tier is missing its volume threshold"))?;
            let percentage = tier
                .get(1)
                .ok_or_else(|| malformed("fee tier is missing its percentage"))?;

            Ok(FeeTier {
                volume: volume.trunc() as u64,
                percentage: decimal_f64(*percentage)?,
            })
        })
        .collect()
}

fn parse_tickers(payload: &[u8]) -> Result<Tickers, ExchangeError> {
    let msg: Envelope<HashMap<String, RawTicker>> = decode_envelope(payload)?;

    let mut tickers = HashMap::with_capacity(msg.result.len());
    for (pair, raw) in msg.result {
        let ticker = parse_ticker(pair.clone(), &raw)?;
        tickers.insert(pair, ticker);
    }

    Ok(Tickers {
        errors: classify_errors(&msg.error),
        tickers,
    })
}

fn parse_ticker(pair: String, raw: &RawTicker) -> Result<Ticker, ExchangeError> {
    // ask/bid rows are [price, whole lot volume, lot volume]; price reads
    // slot 0 and volume reads slot 2, never slot 1. Consumers rely on this
    // positional mapping, so it is kept as-is.
    let ask = AskBid {
        price: decimal_str(ticker_field(&raw.ask, 0, "a")?)?,
        volume: decimal_str(ticker_field(&raw.ask, 2, "a")?)?,
        timestamp: None,
    };
    let bid = AskBid {
        price: decimal_str(ticker_field(&raw.bid, 0, "b")?)?,
        volume: decimal_str(ticker_field(&raw.bid, 2, "b")?)?,
        timestamp: None,
    };

    let last_close = LastClose {
        price: decimal_str(ticker_field(&raw.last_close, 0, "c")?)?,
        volume: decimal_str(ticker_field(&raw.last_close, 1, "c")?)?,
    };

    Ok(Ticker {
        pair,
        ask,
        bid,
        last_close,
        volume_today: decimal_str(ticker_field(&raw.volume, 0, "v")?)?,
        volume_last_24h: decimal_str(ticker_field(&raw.volume, 1, "v")?)?,
        vwap_today: decimal_str(ticker_field(&raw.vwap, 0, "p")?)?,
        vwap_last_24h: decimal_str(ticker_field(&raw.vwap, 1, "p")?)?,
        trades_today: count_field(&raw.trade_count, 0)?,
        trades_last_24h: count_field(&raw.trade_count, 1)?,
        low_today: decimal_str(ticker_field(&raw.low, 0, "l")?)?,
        low_last_24h: decimal_str(ticker_field(&raw.low, 1, "l")?)?,
        high_today: decimal_str(ticker_field(&raw.high, 0, "h")?)?,
        high_last_24h: decimal_str(ticker_field(&raw.high, 1, "h")?)?,
        open: decimal_str(&raw.open)?,
    })
}

fn ticker_field<'a>(
    values: &'a [String],
    idx: usize,
    field: &'static str,
) -> Result<&'a str, ExchangeError> {
    values.get(idx).map(String::as_str).ok_or_else(|| {
        malformed(format!(
            "ticker field {:?} has {} entries, expected at least {}",
            field,
            values.len(),
            idx + 1
        ))
    })
}

fn count_field(values: &[u64], idx: usize) -> Result<u64, ExchangeError> {
    values.get(idx).copied().ok_or_else(|| {
        malformed(format!(
            "ticker trade counts have {} entries, expected at least {}",
            values.len(),
            idx + 1
        ))
    })
}

fn parse_ohlcs(payload: &[u8]) -> Result<Ohlcs, ExchangeError> {
    let msg: Envelope<RawSeries> = decode_envelope(payload)?;

    let mut candles = HashMap::new();
    let mut last_id = 0;
    for (key, value) in msg.result {
        if key == CURSOR_KEY {
            last_id = numeric_cursor(&value)?;
            continue;
        }

        let rows = series_rows(&key, &value)?;
        let series = rows
            .iter()
            .map(|row| parse_candle_row(as_row(row)?))
            .collect::<Result<Vec<_>, _>>()?;
        candles.insert(key, series);
    }

    Ok(Ohlcs {
        errors: classify_errors(&msg.error),
        candles,
        last_id,
    })
}

/// One candle row:
/// `[time, open, high, low, close, vwap, volume, count]`.
/// Volume sits after vwap on the wire, the reverse of most consumers'
/// field order.
fn parse_candle_row(row: &[Value]) -> Result<Ohlc, ExchangeError> {
    Ok(Ohlc {
        time: epoch_slot(row, 0)?,
        open: decimal_str(str_slot(row, 1)?)?,
        high: decimal_str(str_slot(row, 2)?)?,
        low: decimal_str(str_slot(row, 3)?)?,
        close: decimal_str(str_slot(row, 4)?)?,
        vwap: decimal_str(str_slot(row, 5)?)?,
        volume: decimal_str(str_slot(row, 6)?)?,
        count: u64_slot(row, 7)?,
    })
}

fn parse_order_book(payload: &[u8]) -> Result<OrderBook, ExchangeError> {
    let msg: Envelope<HashMap<String, RawDepth>> = decode_envelope(payload)?;

    let mut asks = HashMap::with_capacity(msg.result.len());
    let mut bids = HashMap::with_capacity(msg.result.len());
    for (pair, depth) in msg.result {
        asks.insert(pair.clone(), parse_depth_levels(&depth.asks)?);
        bids.insert(pair, parse_depth_levels(&depth.bids)?);
    }

    Ok(OrderBook {
        errors: classify_errors(&msg.error),
        asks,
        bids,
    })
}

/// Depth rows are `[price, volume, time]` as native numbers; prices and
/// volumes convert through their float representation since the wire
/// provides no string form here.
fn parse_depth_levels(rows: &[Vec<Value>]) -> Result<Vec<AskBid>, ExchangeError> {
    rows.iter()
        .map(|row| {
            let row = row.as_slice();
            Ok(AskBid {
                price: decimal_f64(f64_slot(row, 0)?)?,
                volume: decimal_f64(f64_slot(row, 1)?)?,
                timestamp: Some(epoch_slot(row, 2)?),
            })
        })
        .collect()
}

fn parse_recent_trades(payload: &[u8]) -> Result<RecentTrades, ExchangeError> {
    let msg: Envelope<RawSeries> = decode_envelope(payload)?;

    let mut trades = HashMap::new();
    let mut last_id = 0;
    for (key, value) in msg.result {
        if key == CURSOR_KEY {
            // this cursor arrives as a decimal string wider than a double's
            // 53-bit mantissa; it must never pass through a float
            last_id = string_cursor(&value)?;
            continue;
        }

        let rows = series_rows(&key, &value)?;
        let series = rows
            .iter()
            .map(|row| parse_trade_row(as_row(row)?))
            .collect::<Result<Vec<_>, _>>()?;
        trades.insert(key, series);
    }

    Ok(RecentTrades {
        errors: classify_errors(&msg.error),
        trades,
        last_id,
    })
}

/// One trade row: `[price, volume, time, action, type, misc]`. Price and
/// volume are decimal strings, time is fractional epoch seconds, action and
/// type are single-character markers.
fn parse_trade_row(row: &[Value]) -> Result<RecentTrade, ExchangeError> {
    let action = match str_slot(row, 3)? {
        "b" => OrderAction::Buy,
        "s" => OrderAction::Sell,
        _ => OrderAction::Unknown,
    };

    let order_type = match str_slot(row, 4)? {
        "l" => OrderType::Limit,
        "m" => OrderType::Market,
        _ => OrderType::Unknown,
    };

    Ok(RecentTrade {
        price: decimal_str(str_slot(row, 0)?)?,
        volume: decimal_str(str_slot(row, 1)?)?,
        // TODO carry the wire's fractional seconds once sub-second trade
        // times are needed
        time: epoch_slot(row, 2)?,
        action,
        order_type,
        miscellaneous: str_slot(row, 5)?.to_string(),
    })
}

fn parse_recent_spreads(payload: &[u8]) -> Result<RecentSpreads, ExchangeError> {
    let msg: Envelope<RawSeries> = decode_envelope(payload)?;

    let mut spreads = HashMap::new();
    let mut last_id = 0;
    for (key, value) in msg.result {
        if key == CURSOR_KEY {
            last_id = numeric_cursor(&value)?;
            continue;
        }

        let rows = series_rows(&key, &value)?;
        let series = rows
            .iter()
            .map(|row| parse_spread_row(as_row(row)?))
            .collect::<Result<Vec<_>, _>>()?;
        spreads.insert(key, series);
    }

    Ok(RecentSpreads {
        errors: classify_errors(&msg.error),
        spreads,
        last_id,
    })
}

/// One spread row: `[time, bid, ask]` with decimal-string quotes.
fn parse_spread_row(row: &[Value]) -> Result<Spread, ExchangeError> {
    Ok(Spread {
        timestamp: epoch_slot(row, 0)?,
        bid: decimal_str(str_slot(row, 1)?)?,
        ask: decimal_str(str_slot(row, 2)?)?,
    })
}

fn series_rows<'a>(key: &str, value: &'a Value) -> Result<&'a [Value], ExchangeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| malformed(format!("series for {:?} is not an array", key)))
}

fn as_row(value: &Value) -> Result<&[Value], ExchangeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| malformed("series entry is not an array"))
}
