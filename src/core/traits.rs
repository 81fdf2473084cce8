use crate::core::{
    errors::ExchangeError,
    types::{
        AssetPairInfo, AssetPairs, Assets, OhlcInterval, Ohlcs, OrderBook, RecentSpreads,
        RecentTrades, ServerTime, SystemStatus, Tickers,
    },
};
use async_trait::async_trait;

/// The public market-data operations of the exchange.
///
/// Implemented by the concrete REST client and by decorators that wrap one
/// (e.g. the metrics decorator), so callers can swap either in.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Current server time.
    async fn time(&self) -> Result<ServerTime, ExchangeError>;

    /// Current operational status of the exchange.
    async fn system_status(&self) -> Result<SystemStatus, ExchangeError>;

    /// All tradable assets.
    async fn assets(&self) -> Result<Assets, ExchangeError>;

    /// Tradable asset pairs; `pairs` empty means all.
    async fn asset_pairs(
        &self,
        info: AssetPairInfo,
        pairs: &[&str],
    ) -> Result<AssetPairs, ExchangeError>;

    /// Ticker snapshots; `pairs` empty means all.
    async fn tickers(&self, pairs: &[&str]) -> Result<Tickers, ExchangeError>;

    /// Candles for the given pairs, optionally only those newer than the
    /// `since` cursor of a previous response.
    async fn ohlc(
        &self,
        interval: OhlcInterval,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<Ohlcs, ExchangeError>;

    /// Order book with at most `count` levels per side.
    async fn order_book(&self, count: u32, pairs: &[&str]) -> Result<OrderBook, ExchangeError>;

    /// Recent trades, optionally newer than the `since` cursor.
    async fn recent_trades(
        &self,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<RecentTrades, ExchangeError>;

    /// Recent spreads, optionally newer than the `since` cursor.
    async fn recent_spreads(
        &self,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<RecentSpreads, ExchangeError>;
}
