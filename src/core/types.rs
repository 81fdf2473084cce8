use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::core::errors::ApiError;

/// Server time reported by `/public/Time`.
///
/// The wire encodes this timestamp as epoch seconds, unlike
/// [`SystemStatus`] whose timestamp arrives as RFC 3339 text. The two
/// encodings are deliberately kept per-endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerTime {
    /// In-band errors reported by the API; `None` when the wire error array
    /// was empty.
    pub errors: Option<Vec<ApiError>>,
    pub timestamp: DateTime<Utc>,
}

/// Operational status reported by `/public/SystemStatus`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub errors: Option<Vec<ApiError>>,
    /// Status string as reported, e.g. `"online"` or `"maintenance"`.
    pub status: String,
    /// Parsed from the RFC 3339 wire text and normalized to UTC.
    pub timestamp: DateTime<Utc>,
}

/// Parsed response of `/public/Assets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assets {
    pub errors: Option<Vec<ApiError>>,
    /// Keyed by asset name; each value repeats the name in its `name` field.
    pub assets: HashMap<String, Asset>,
}

/// One tradable currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Asset name. The wire keys the collection by name without repeating it
    /// inside the record; the codec injects it here.
    pub name: String,
    pub class: String,
    pub alt_name: String,
    /// Number of decimal places the exchange tracks for this asset.
    pub precision: u32,
    /// Number of decimal places shown in user interfaces.
    pub display_precision: u32,
}

/// Parsed response of `/public/AssetPairs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetPairs {
    pub errors: Option<Vec<ApiError>>,
    pub pairs: HashMap<String, AssetPair>,
}

/// One tradable market.
///
/// Base and quote reference assets by name, not by object; resolving them
/// against an [`Assets`] snapshot is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetPair {
    pub alt_name: String,
    pub websocket_name: String,
    pub asset_class_base: String,
    pub base: String,
    pub asset_class_quote: String,
    pub quote: String,
    pub lot: String,
    pub pair_precision: u32,
    pub lot_precision: u32,
    pub lot_multiplier: u32,
    pub leverage_buy: Vec<u32>,
    pub leverage_sell: Vec<u32>,
    /// Taker fee ladder, ascending by volume threshold as returned; callers
    /// apply first-match-wins.
    pub fees_taker: Vec<FeeTier>,
    /// Maker fee ladder, same ordering contract as `fees_taker`.
    pub fees_maker: Vec<FeeTier>,
    pub fee_volume_currency: String,
    pub margin_call: u32,
    pub margin_stop: u32,
    pub order_min: Decimal,
}

/// One rung of a fee ladder: at `volume` traded, `percentage` applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeTier {
    pub volume: u64,
    pub percentage: Decimal,
}

/// Parsed response of `/public/Ticker`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tickers {
    pub errors: Option<Vec<ApiError>>,
    pub tickers: HashMap<String, Ticker>,
}

/// Snapshot of one market. All numeric fields keep exact decimal precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker {
    pub pair: String,
    pub ask: AskBid,
    pub bid: AskBid,
    pub last_close: LastClose,
    pub volume_today: Decimal,
    pub volume_last_24h: Decimal,
    pub vwap_today: Decimal,
    pub vwap_last_24h: Decimal,
    pub trades_today: u64,
    pub trades_last_24h: u64,
    pub low_today: Decimal,
    pub low_last_24h: Decimal,
    pub high_today: Decimal,
    pub high_last_24h: Decimal,
    pub open: Decimal,
}

/// A price level: best ask/bid of a ticker or one order-book entry.
///
/// The timestamp is only present where the wire supplies one (order-book
/// levels); ticker ask/bid rows carry none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskBid {
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Price and volume of the most recent closed trade. No timestamp slot on
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastClose {
    pub price: Decimal,
    pub volume: Decimal,
}

/// Parsed response of `/public/OHLC`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ohlcs {
    pub errors: Option<Vec<ApiError>>,
    /// Candles per pair, chronological as returned.
    pub candles: HashMap<String, Vec<Ohlc>>,
    /// Cursor for incremental polling; pass as `since` on the next call.
    pub last_id: u64,
}

/// One time-bucketed candle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ohlc {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub vwap: Decimal,
    pub volume: Decimal,
    pub count: u64,
}

/// Parsed response of `/public/OrderBook`. No cursor on this endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBook {
    pub errors: Option<Vec<ApiError>>,
    pub asks: HashMap<String, Vec<AskBid>>,
    pub bids: HashMap<String, Vec<AskBid>>,
}

/// Parsed response of `/public/Trades`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTrades {
    pub errors: Option<Vec<ApiError>>,
    pub trades: HashMap<String, Vec<RecentTrade>>,
    /// Cursor for incremental polling. Arrives as a decimal string wider
    /// than 53 bits; parsed as an exact integer, never through a float.
    pub last_id: u64,
}

/// One executed trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTrade {
    pub price: Decimal,
    pub volume: Decimal,
    pub time: DateTime<Utc>,
    pub action: OrderAction,
    pub order_type: OrderType,
    /// Free-text annotation from the exchange, usually empty.
    pub miscellaneous: String,
}

/// Parsed response of `/public/Spread`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSpreads {
    pub errors: Option<Vec<ApiError>>,
    pub spreads: HashMap<String, Vec<Spread>>,
    pub last_id: u64,
}

/// One bid/ask spread observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spread {
    pub timestamp: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
}

/// Side of an executed trade. Unrecognized wire values map to `Unknown`
/// rather than failing the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderAction {
    Buy,
    Sell,
    Unknown,
}

impl OrderAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution type of a trade. Unrecognized wire values map to `Unknown`
/// rather than failing the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderType {
    Market,
    Limit,
    Unknown,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `info` query value accepted by the asset-pairs endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetPairInfo {
    Info,
    Leverage,
    Fees,
    Margin,
}

impl AssetPairInfo {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Leverage => "leverage",
            Self::Fees => "fees",
            Self::Margin => "margin",
        }
    }
}

impl fmt::Display for AssetPairInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candle interval accepted by the OHLC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OhlcInterval {
    Minutes1,
    Minutes5,
    Minutes15,
    Minutes30,
    Hours1,
    Hours4,
    Days1,
    Weeks1,
    Days15,
}

impl OhlcInterval {
    /// Interval length in minutes, the unit the query parameter expects.
    pub fn minutes(self) -> u32 {
        match self {
            Self::Minutes1 => 1,
            Self::Minutes5 => 5,
            Self::Minutes15 => 15,
            Self::Minutes30 => 30,
            Self::Hours1 => 60,
            Self::Hours4 => 240,
            Self::Days1 => 1440,
            Self::Weeks1 => 10080,
            Self::Days15 => 21600,
        }
    }
}

impl fmt::Display for OhlcInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_action_strings() {
        assert_eq!(OrderAction::Buy.as_str(), "buy");
        assert_eq!(OrderAction::Sell.as_str(), "sell");
        assert_eq!(OrderAction::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_order_type_strings() {
        assert_eq!(OrderType::Market.as_str(), "market");
        assert_eq!(OrderType::Limit.as_str(), "limit");
        assert_eq!(OrderType::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_ohlc_interval_minutes() {
        assert_eq!(OhlcInterval::Minutes1.minutes(), 1);
        assert_eq!(OhlcInterval::Hours4.minutes(), 240);
        assert_eq!(OhlcInterval::Days15.minutes(), 21600);
        assert_eq!(OhlcInterval::Weeks1.to_string(), "10080");
    }

    #[test]
    fn test_asset_pair_info_strings() {
        assert_eq!(AssetPairInfo::Info.as_str(), "info");
        assert_eq!(AssetPairInfo::Leverage.as_str(), "leverage");
        assert_eq!(AssetPairInfo::Fees.as_str(), "fees");
        assert_eq!(AssetPairInfo::Margin.as_str(), "margin");
    }
}
