//! Kraken-specific layers: wire shapes, the response codec, the typed REST
//! surface, assembly helpers and the metrics decorator.

pub mod builder;
pub mod codec;
pub mod metrics;
pub mod rest;
pub(crate) mod types;

pub use builder::{build_client, build_instrumented_client, DEFAULT_BASE_URL};
pub use codec::{parse, ParseResponse};
pub use metrics::{ClientMetrics, InstrumentedClient, OperationSnapshot};
pub use rest::KrakenRestClient;
