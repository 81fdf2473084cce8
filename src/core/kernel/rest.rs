use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::Signer;
use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{instrument, trace};

/// REST transport handing back raw response bytes.
///
/// Payload interpretation belongs entirely to the codec, so the transport's
/// contract is deliberately narrow: bytes out, with status and network
/// failures mapped to [`ExchangeError`].
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request against a public endpoint
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path
    /// * `query_params` - Query parameters as key-value pairs
    ///
    /// # Returns
    /// The raw response body bytes
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError>;

    /// Make a signed POST request against a private endpoint
    ///
    /// A nonce is generated per call, merged into the form body and signed
    /// together with it; the resulting authentication headers are attached
    /// to the request.
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path
    /// * `form_params` - Form body parameters as key-value pairs
    ///
    /// # Returns
    /// The raw response body bytes
    async fn post_signed(
        &self,
        endpoint: &str,
        form_params: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    /// Create a new configuration
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "krakenx/0.1".to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl RestClientBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::InvalidParameters(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
        })
    }
}

/// Implementation of [`RestClient`] using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    /// Create a new `ReqwestRest` instance with default configuration
    pub fn new(
        base_url: String,
        exchange_name: String,
        signer: Option<Arc<dyn Signer>>,
    ) -> Result<Self, ExchangeError> {
        let config = RestClientConfig::new(base_url, exchange_name);
        let mut builder = RestClientBuilder::new(config);
        if let Some(signer) = signer {
            builder = builder.with_signer(signer);
        }
        builder.build()
    }

    /// Current timestamp in milliseconds, used as the request nonce
    fn nonce() -> Result<u64, ExchangeError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|e| ExchangeError::NetworkError(format!("Failed to get timestamp: {}", e)))
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Create a form/query string from parameters
    fn encode_params(params: &[(String, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Check the response status and extract the body bytes
    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Vec<u8>, ExchangeError> {
        let status = response.status();

        if status.is_success() {
            let payload = response.bytes().await.map_err(|e| {
                ExchangeError::NetworkError(format!("Failed to read response body: {}", e))
            })?;
            trace!(bytes = payload.len(), "response body received");
            Ok(payload.to_vec())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ExchangeError::StatusError {
                code: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError> {
        let url = self.build_url(endpoint);
        let mut request = self.client.request(Method::GET, &url);

        for (key, value) in query_params {
            request = request.query(&[(key, value)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Request failed: {}", e)))?;

        self.handle_response(response).await
    }

    #[instrument(skip(self, form_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn post_signed(
        &self,
        endpoint: &str,
        form_params: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::AuthError("Authentication required but no signer provided".to_string())
        })?;

        let nonce = Self::nonce()?;
        let mut params: Vec<(String, String)> = vec![("nonce".to_string(), nonce.to_string())];
        params.extend(
            form_params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        let body = Self::encode_params(&params);

        let url = self.build_url(endpoint);
        let path = Url::parse(&url)
            .map_err(|e| ExchangeError::InvalidParameters(format!("Invalid URL {}: {}", url, e)))?
            .path()
            .to_string();

        let headers = signer.sign_request(&path, nonce, &body)?;

        let mut request = self
            .client
            .request(Method::POST, &url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body);

        for (key, value) in headers {
            request = request.header(&key, &value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Request failed: {}", e)))?;

        self.handle_response(response).await
    }
}
