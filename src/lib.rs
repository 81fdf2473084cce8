//! Typed async client for the Kraken spot exchange public market-data API.
//!
//! The heart of the crate is the response codec ([`crate::kraken::codec`]):
//! the exchange answers every endpoint with the same `error`/`result`
//! envelope but fills `result` with irregular shapes: maps with reserved
//! cursor keys, short positional arrays of mixed element types, decimals
//! encoded as strings or native numbers depending on the endpoint. The
//! codec normalizes all of that into the strongly typed models in
//! [`crate::core::types`], preserving exact decimal precision and
//! classifying the API's in-band error strings into typed categories.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use krakenx::{build_client, ExchangeConfig, MarketDataClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = build_client(&ExchangeConfig::read_only())?;
//!     let time = client.time().await?;
//!     println!("server time: {}", time.timestamp);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod kraken;

pub use crate::core::config::ExchangeConfig;
pub use crate::core::errors::{ApiError, ApiErrorKind, ExchangeError};
pub use crate::core::traits::MarketDataClient;
pub use crate::core::types::*;
pub use crate::kraken::{build_client, build_instrumented_client, KrakenRestClient};
