//! Transport kernel: generic REST plumbing and request signing.
//!
//! The kernel contains no endpoint-specific logic. [`RestClient`] moves raw
//! bytes; [`Signer`] produces authentication headers for private calls. The
//! typed surface and the response codec live above this layer and consume it
//! through the traits, so both are swappable in tests.

pub mod rest;
pub mod signer;

// Re-export key types for convenience
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{KrakenSigner, Signer};
