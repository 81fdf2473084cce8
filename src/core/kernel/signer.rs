use crate::core::errors::ExchangeError;
use base64::engine::general_purpose;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use std::collections::HashMap;

/// Signer trait for private-endpoint authentication
///
/// Implementations produce the authentication headers for one request from
/// the request path, the nonce and the exact form body that will be sent.
pub trait Signer: Send + Sync {
    /// Sign a request and return the headers to attach
    ///
    /// # Arguments
    /// * `path` - URL path of the endpoint (e.g. `/0/private/Balance`)
    /// * `nonce` - strictly increasing nonce, already present in `body`
    /// * `body` - url-encoded form body exactly as it will be sent
    fn sign_request(
        &self,
        path: &str,
        nonce: u64,
        body: &str,
    ) -> Result<HashMap<String, String>, ExchangeError>;
}

/// Keyed-hash signer for the exchange's private API.
///
/// The signature is `base64(HMAC-SHA512(path + SHA256(nonce + body)))`,
/// keyed with the base64-decoded API secret.
pub struct KrakenSigner {
    api_key: String,
    secret: Vec<u8>,
}

impl std::fmt::Debug for KrakenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenSigner")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl KrakenSigner {
    /// Create a new signer, validating that the secret is decodable base64.
    pub fn new(api_key: String, secret_b64: &str) -> Result<Self, ExchangeError> {
        let secret = general_purpose::STANDARD
            .decode(secret_b64)
            .map_err(|e| ExchangeError::AuthError(format!("invalid secret: {}", e)))?;

        Ok(Self { api_key, secret })
    }

    fn signature(&self, path: &str, nonce: u64, body: &str) -> Result<String, ExchangeError> {
        let mut sha = Sha256::new();
        sha.update(nonce.to_string().as_bytes());
        sha.update(body.as_bytes());
        let digest = sha.finalize();

        let mut mac = Hmac::<Sha512>::new_from_slice(&self.secret)
            .map_err(|e| ExchangeError::AuthError(format!("invalid secret key: {}", e)))?;
        mac.update(path.as_bytes());
        mac.update(&digest);

        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl Signer for KrakenSigner {
    fn sign_request(
        &self,
        path: &str,
        nonce: u64,
        body: &str,
    ) -> Result<HashMap<String, String>, ExchangeError> {
        let mut headers = HashMap::new();
        headers.insert("API-Key".to_string(), self.api_key.clone());
        headers.insert("API-Sign".to_string(), self.signature(path, nonce, body)?);

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known-answer vector published in the exchange's API documentation.
    const DOC_SECRET: &str =
        "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

    #[test]
    fn test_signature_known_answer() {
        let signer = KrakenSigner::new("key".to_string(), DOC_SECRET).unwrap();

        let signature = signer
            .signature(
                "/0/private/AddOrder",
                1_616_492_376_594,
                "nonce=1616492376594&ordertype=limit&pair=XBTUSD&price=37500&type=buy&volume=1.25",
            )
            .unwrap();

        assert_eq!(
            signature,
            "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ=="
        );
    }

    #[test]
    fn test_sign_request_sets_both_headers() {
        let signer = KrakenSigner::new("api-key".to_string(), DOC_SECRET).unwrap();
        let headers = signer
            .sign_request("/0/private/Balance", 1, "nonce=1")
            .unwrap();

        assert_eq!(headers.get("API-Key").map(String::as_str), Some("api-key"));
        assert!(headers.contains_key("API-Sign"));
    }

    #[test]
    fn test_invalid_base64_secret_is_rejected() {
        let err = KrakenSigner::new("key".to_string(), "not base64!!!").unwrap_err();
        assert!(matches!(err, ExchangeError::AuthError(_)));
    }
}
