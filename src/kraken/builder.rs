//! Assembly helpers wiring configuration, transport and signer into a
//! ready-to-use client.

use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{KrakenSigner, ReqwestRest, RestClientBuilder, RestClientConfig};
use crate::kraken::metrics::{ClientMetrics, InstrumentedClient};
use crate::kraken::rest::KrakenRestClient;
use std::sync::Arc;

/// Production endpoint for the public API.
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com/0";

/// Create a client from configuration.
///
/// Credentials, when present, are validated (the secret must be decodable
/// base64) and wired into the transport as a signer; the public market-data
/// endpoints work without any.
pub fn build_client(config: &ExchangeConfig) -> Result<KrakenRestClient<ReqwestRest>, ExchangeError> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let rest_config = RestClientConfig::new(base_url, "kraken".to_string()).with_timeout(30);
    let mut rest_builder = RestClientBuilder::new(rest_config);

    if config.has_credentials() {
        let signer = Arc::new(KrakenSigner::new(
            config.api_key().to_string(),
            config.secret_key(),
        )?);
        rest_builder = rest_builder.with_signer(signer);
    }

    Ok(KrakenRestClient::new(rest_builder.build()?))
}

/// Same as [`build_client`], with every operation recorded in `metrics`.
pub fn build_instrumented_client(
    config: &ExchangeConfig,
    metrics: Arc<ClientMetrics>,
) -> Result<InstrumentedClient<KrakenRestClient<ReqwestRest>>, ExchangeError> {
    Ok(InstrumentedClient::new(build_client(config)?, metrics))
}
