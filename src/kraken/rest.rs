//! Thin typed wrapper over the transport: one method per public endpoint,
//! each fetching raw bytes and handing them to the codec.

use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::traits::MarketDataClient;
use crate::core::types::{
    AssetPairInfo, AssetPairs, Assets, OhlcInterval, Ohlcs, OrderBook, RecentSpreads,
    RecentTrades, ServerTime, SystemStatus, Tickers,
};
use crate::kraken::codec;
use async_trait::async_trait;

/// Typed client for the public market-data endpoints.
///
/// Generic over [`RestClient`] so tests can substitute a canned transport.
#[derive(Debug)]
pub struct KrakenRestClient<R: RestClient> {
    client: R,
}

impl<R: RestClient> KrakenRestClient<R> {
    pub fn new(client: R) -> Self {
        Self { client }
    }

    fn require_pairs(pairs: &[&str]) -> Result<(), ExchangeError> {
        if pairs.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "pairs are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: RestClient> MarketDataClient for KrakenRestClient<R> {
    async fn time(&self) -> Result<ServerTime, ExchangeError> {
        let payload = self.client.get("/public/time", &[]).await?;
        codec::parse(&payload)
    }

    async fn system_status(&self) -> Result<SystemStatus, ExchangeError> {
        let payload = self.client.get("/public/SystemStatus", &[]).await?;
        codec::parse(&payload)
    }

    async fn assets(&self) -> Result<Assets, ExchangeError> {
        let payload = self.client.get("/public/Assets", &[]).await?;
        codec::parse(&payload)
    }

    async fn asset_pairs(
        &self,
        info: AssetPairInfo,
        pairs: &[&str],
    ) -> Result<AssetPairs, ExchangeError> {
        let joined = pairs.join(",");
        let mut params = vec![("info", info.as_str())];
        if !pairs.is_empty() {
            params.push(("pairs", joined.as_str()));
        }

        let payload = self.client.get("/public/AssetPairs", &params).await?;
        codec::parse(&payload)
    }

    async fn tickers(&self, pairs: &[&str]) -> Result<Tickers, ExchangeError> {
        let joined = pairs.join(",");
        let mut params = Vec::new();
        if !pairs.is_empty() {
            params.push(("pairs", joined.as_str()));
        }

        let payload = self.client.get("/public/Ticker", &params).await?;
        codec::parse(&payload)
    }

    async fn ohlc(
        &self,
        interval: OhlcInterval,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<Ohlcs, ExchangeError> {
        Self::require_pairs(pairs)?;

        let joined = pairs.join(",");
        let interval_str = interval.minutes().to_string();
        let mut params = vec![("pairs", joined.as_str()), ("interval", interval_str.as_str())];

        let since_str;
        if let Some(since) = since {
            since_str = since.to_string();
            params.push(("since", &since_str));
        }

        let payload = self.client.get("/public/OHLC", &params).await?;
        codec::parse(&payload)
    }

    async fn order_book(&self, count: u32, pairs: &[&str]) -> Result<OrderBook, ExchangeError> {
        Self::require_pairs(pairs)?;

        let joined = pairs.join(",");
        let count_str = count.to_string();
        let params = [("pairs", joined.as_str()), ("count", count_str.as_str())];

        let payload = self.client.get("/public/OrderBook", &params).await?;
        codec::parse(&payload)
    }

    async fn recent_trades(
        &self,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<RecentTrades, ExchangeError> {
        Self::require_pairs(pairs)?;

        let joined = pairs.join(",");
        let mut params = vec![("pairs", joined.as_str())];

        let since_str;
        if let Some(since) = since {
            since_str = since.to_string();
            params.push(("since", &since_str));
        }

        let payload = self.client.get("/public/Trades", &params).await?;
        codec::parse(&payload)
    }

    async fn recent_spreads(
        &self,
        since: Option<u64>,
        pairs: &[&str],
    ) -> Result<RecentSpreads, ExchangeError> {
        Self::require_pairs(pairs)?;

        let joined = pairs.join(",");
        let mut params = vec![("pairs", joined.as_str())];

        let since_str;
        if let Some(since) = since {
            since_str = since.to_string();
            params.push(("since", &since_str));
        }

        let payload = self.client.get("/public/Spread", &params).await?;
        codec::parse(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport stub that records the request and replays a canned payload.
    struct RecordingRest {
        payload: Vec<u8>,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl RecordingRest {
        fn new(payload: &[u8]) -> Self {
            Self {
                payload: payload.to_vec(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> (String, Vec<(String, String)>) {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl RestClient for RecordingRest {
        async fn get(
            &self,
            endpoint: &str,
            query_params: &[(&str, &str)],
        ) -> Result<Vec<u8>, ExchangeError> {
            self.requests.lock().unwrap().push((
                endpoint.to_string(),
                query_params
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ));
            Ok(self.payload.clone())
        }

        async fn post_signed(
            &self,
            _endpoint: &str,
            _form_params: &[(&str, &str)],
        ) -> Result<Vec<u8>, ExchangeError> {
            unimplemented!("no private endpoints in these tests")
        }
    }

    #[tokio::test]
    async fn test_time_hits_endpoint_and_parses() {
        let rest = RecordingRest::new(br#"{"error":[],"result":{"unixtime":1643584726}}"#);
        let client = KrakenRestClient::new(rest);

        let time = client.time().await.unwrap();
        assert!(time.errors.is_none());
        assert_eq!(client.client.last_request().0, "/public/time");
    }

    #[tokio::test]
    async fn test_ohlc_builds_query_params() {
        let rest = RecordingRest::new(br#"{"error":[],"result":{"last":0}}"#);
        let client = KrakenRestClient::new(rest);

        client
            .ohlc(OhlcInterval::Hours1, Some(1_643_757_240), &["XXBTZUSD", "XETHZUSD"])
            .await
            .unwrap();

        let (endpoint, params) = client.client.last_request();
        assert_eq!(endpoint, "/public/OHLC");
        assert_eq!(
            params,
            vec![
                ("pairs".to_string(), "XXBTZUSD,XETHZUSD".to_string()),
                ("interval".to_string(), "60".to_string()),
                ("since".to_string(), "1643757240".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_order_book_requires_pairs() {
        let rest = RecordingRest::new(br#"{"error":[],"result":{}}"#);
        let client = KrakenRestClient::new(rest);

        let err = client.order_book(10, &[]).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_asset_pairs_omits_empty_pair_list() {
        let rest = RecordingRest::new(br#"{"error":[],"result":{}}"#);
        let client = KrakenRestClient::new(rest);

        client.asset_pairs(AssetPairInfo::Info, &[]).await.unwrap();

        let (endpoint, params) = client.client.last_request();
        assert_eq!(endpoint, "/public/AssetPairs");
        assert_eq!(params, vec![("info".to_string(), "info".to_string())]);
    }
}
