//! Call metrics for the typed client.
//!
//! [`ClientMetrics`] is an explicitly constructed registry shared by
//! reference; there is no process-wide state. [`InstrumentedClient`] wraps
//! any [`MarketDataClient`], counts calls and errors, accumulates call
//! durations per operation and otherwise delegates untouched.

use crate::core::errors::ExchangeError;
use crate::core::traits::MarketDataClient;
use crate::core::types::{
    AssetPairInfo, AssetPairs, Assets, OhlcInterval, Ohlcs, OrderBook, RecentSpreads,
    RecentTrades, ServerTime, SystemStatus, Tickers,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub const OP_TIME: &str = "time";
pub const OP_SYSTEM_STATUS: &str = "system_status";
pub const OP_ASSETS: &str = "assets";
pub const OP_ASSET_PAIRS: &str = "asset_pairs";
pub const OP_TICKERS: &str = "tickers";
pub const OP_OHLC: &str = "ohlc";
pub const OP_ORDER_BOOK: &str = "order_book";
pub const OP_RECENT_TRADES: &str = "recent_trades";
pub const OP_RECENT_SPREADS: &str = "recent_spreads";

/// All operation labels tracked by the registry.
pub const OPERATIONS: [&str; 9] = [
    OP_TIME,
    OP_SYSTEM_STATUS,
    OP_ASSETS,
    OP_ASSET_PAIRS,
    OP_TICKERS,
    OP_OHLC,
    OP_ORDER_BOOK,
    OP_RECENT_TRADES,
    OP_RECENT_SPREADS,
];

#[derive(Default)]
struct OperationMetrics {
    calls: AtomicU64,
    errors: AtomicU64,
    busy_micros: AtomicU64,
}

/// Per-operation call counters. Uses atomics only; safe to share across
/// tasks via [`Arc`].
pub struct ClientMetrics {
    operations: HashMap<&'static str, OperationMetrics>,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self {
            operations: OPERATIONS
                .iter()
                .map(|op| (*op, OperationMetrics::default()))
                .collect(),
        }
    }

    fn record(&self, operation: &'static str, elapsed: Duration, failed: bool) {
        let Some(metrics) = self.operations.get(operation) else {
            return;
        };

        metrics.calls.fetch_add(1, Ordering::Relaxed);
        metrics
            .busy_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        if failed {
            metrics.errors.fetch_add(1, Ordering::Relaxed);
        }

        debug!(operation, failed, elapsed_micros = elapsed.as_micros() as u64, "client call observed");
    }

    /// Point-in-time counters for one operation; `None` for an unknown
    /// label.
    pub fn snapshot(&self, operation: &str) -> Option<OperationSnapshot> {
        self.operations.get(operation).map(|metrics| OperationSnapshot {
            calls: metrics.calls.load(Ordering::Relaxed),
            errors: metrics.errors.load(Ordering::Relaxed),
            busy: Duration::from_micros(metrics.busy_micros.load(Ordering::Relaxed)),
        })
    }
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values for one operation at a moment in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSnapshot {
    pub calls: u64,
    pub errors: u64,
    pub busy: Duration,
}

/// Decorator recording metrics for every client operation.
pub struct InstrumentedClient<C> {
    inner: C,
    metrics: Arc<ClientMetrics>,
}

impl<C> InstrumentedClient<C> {
    pub fn new(inner: C, metrics: Arc<ClientMetrics>) -> Self {
        Self { inner, metrics }
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        started: Instant,
        result: Result<T, ExchangeError>,
    ) -> Result<T, ExchangeError> {
        self.metrics
            .record(operation, started.elapsed(), result.is_err());
        result
    }
}

#[async_trait]
impl<C: MarketDataClient> MarketDataClient for InstrumentedClient<C> {
    async fn time(&self) -> Result<ServerTime, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.time().await;
        self.observe(OP_TIME, started, result)
    }

    async fn system_status(&self) -> Result<SystemStatus, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.system_status().await;
        self.observe(OP_SYSTEM_STATUS, started, result)
    }

    async fn assets(&self) -> Result<Assets, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.assets().await;
        self.observe(OP_ASSETS, started, result)
    }

    async fn asset_pairs(
        &self,
        info: AssetPairInfo,
        pairs: &[&str],
    ) -> Result<AssetPairs, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.asset_pairs(info, pairs).await;
        self.observe(OP_ASSET_PAIRS, started, result)
    }

    async fn tickers(&self, pairs: &[&str]) -> Result<Tickers, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.tickers(pairs).await;
        self.observe(OP_TICKERS, started, result)
    }

    async fn ohlc(
        &self,
        interval: OhlcInterval,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<Ohlcs, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.ohlc(interval, since, pairs).await;
        self.observe(OP_OHLC, started, result)
    }

    async fn order_book(&self, count: u32, pairs: &[&str]) -> Result<OrderBook, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.order_book(count, pairs).await;
        self.observe(OP_ORDER_BOOK, started, result)
    }

    async fn recent_trades(
        &self,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<RecentTrades, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.recent_trades(since, pairs).await;
        self.observe(OP_RECENT_TRADES, started, result)
    }

    async fn recent_spreads(
        &self,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<RecentSpreads, ExchangeError> {
        let started = Instant::now();
        let result = self.inner.recent_spreads(since, pairs).await;
        self.observe(OP_RECENT_SPREADS, started, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap as StdHashMap;

    /// Stub client: `time` succeeds, `assets` always fails.
    struct StubClient;

    #[async_trait]
    impl MarketDataClient for StubClient {
        async fn time(&self) -> Result<ServerTime, ExchangeError> {
            Ok(ServerTime {
                errors: None,
                timestamp: Utc.timestamp_opt(1_643_584_726, 0).unwrap(),
            })
        }

        async fn system_status(&self) -> Result<SystemStatus, ExchangeError> {
            unimplemented!()
        }

        async fn assets(&self) -> Result<Assets, ExchangeError> {
            Err(ExchangeError::NetworkError("stubbed failure".to_string()))
        }

        async fn asset_pairs(
            &self,
            _info: AssetPairInfo,
            _pairs: &[&str],
        ) -> Result<AssetPairs, ExchangeError> {
            unimplemented!()
        }

        async fn tickers(&self, _pairs: &[&str]) -> Result<Tickers, ExchangeError> {
            Ok(Tickers {
                errors: None,
                tickers: StdHashMap::new(),
            })
        }

        async fn ohlc(
            &self,
            _interval: OhlcInterval,
            _since: Option<u64>,
            _pairs: &[&str],
        ) -> Result<Ohlcs, ExchangeError> {
            unimplemented!()
        }

        async fn order_book(
            &self,
            _count: u32,
            _pairs: &[&str],
        ) -> Result<OrderBook, ExchangeError> {
            unimplemented!()
        }

        async fn recent_trades(
            &self,
            _since: Option<u64>,
            _pairs: &[&str],
        ) -> Result<RecentTrades, ExchangeError> {
            unimplemented!()
        }

        async fn recent_spreads(
            &self,
            _since: Option<u64>,
            _pairs: &[&str],
        ) -> Result<RecentSpreads, ExchangeError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_counts_calls_and_preserves_results() {
        let metrics = Arc::new(ClientMetrics::new());
        let client = InstrumentedClient::new(StubClient, Arc::clone(&metrics));

        let time = client.time().await.unwrap();
        assert_eq!(time.timestamp, Utc.timestamp_opt(1_643_584_726, 0).unwrap());
        client.time().await.unwrap();
        client.tickers(&[]).await.unwrap();

        let time_stats = metrics.snapshot(OP_TIME).unwrap();
        assert_eq!(time_stats.calls, 2);
        assert_eq!(time_stats.errors, 0);

        let ticker_stats = metrics.snapshot(OP_TICKERS).unwrap();
        assert_eq!(ticker_stats.calls, 1);

        let assets_stats = metrics.snapshot(OP_ASSETS).unwrap();
        assert_eq!(assets_stats.calls, 0);
    }

    #[tokio::test]
    async fn test_counts_errors_without_swallowing_them() {
        let metrics = Arc::new(ClientMetrics::new());
        let client = InstrumentedClient::new(StubClient, Arc::clone(&metrics));

        let err = client.assets().await.unwrap_err();
        assert!(matches!(err, ExchangeError::NetworkError(_)));

        let stats = metrics.snapshot(OP_ASSETS).unwrap();
        assert_eq!(stats.calls, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_unknown_operation_has_no_snapshot() {
        let metrics = ClientMetrics::new();
        assert!(metrics.snapshot("not_an_operation").is_none());
    }
}
