//! Klaviyo HTTP Client
//!
//! Provides the HTTP transport for Klaviyo API calls.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

use crate::error::KlaviyoError;
use crate::types::{PrivateKey, PublicKey};

pub(crate) const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub(crate) type MiddlewareFuture =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send>>;
pub(crate) type MiddlewareExecutor =
    Arc<dyn Fn(reqwest::Request) -> MiddlewareFuture + Send + Sync>;

/// Request body with the private key merged in, as v2 write endpoints expect.
#[derive(Serialize)]
struct WithApiKey<'a, B: Serialize> {
    api_key: &'a str,
    #[serde(flatten)]
    body: &'a B,
}

/// Klaviyo API Client
///
/// Holds the credentials and a pooled reqwest client. Cloning is cheap and
/// clones share the connection pool.
#[derive(Clone)]
pub struct KlaviyoClient {
    http: Client,
    public_key: PublicKey,
    private_key: PrivateKey,
    base_url: String,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for KlaviyoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoClient")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("base_url", &self.base_url)
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl KlaviyoClient {
    /// Create a new client builder
    pub fn builder() -> KlaviyoClientBuilder {
        KlaviyoClientBuilder::default()
    }

    /// Get the public key
    pub fn public_key(&self) -> &str {
        self.public_key.as_str()
    }

    pub(crate) fn private_key(&self) -> &str {
        self.private_key.as_str()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Percent-encodes a caller-supplied id for use as a path segment.
    pub(crate) fn encode_segment(segment: &str) -> String {
        utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
    }

    /// Returns the underlying [`reqwest::Client`] for raw HTTP requests.
    ///
    /// Note: requests made through this client bypass the middleware pipeline.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn with_middleware_executor(mut self, executor: MiddlewareExecutor) -> Self {
        self.middleware_executor = Some(executor);
        self
    }

    pub(crate) async fn send_request(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    async fn send_checked(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, KlaviyoError> {
        let response = self.send_request(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KlaviyoError::from_response(status.as_u16(), &body));
        }

        Ok(response)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, KlaviyoError> {
        let response = self.send_checked(request).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|e| KlaviyoError::Decode(e.to_string()))
    }

    async fn execute_text(
        &self,
        request: reqwest::Request,
    ) -> Result<(u16, String), KlaviyoError> {
        let response = self.send_checked(request).await?;
        let status = response.status().as_u16();
        Ok((status, response.text().await?))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a private-key endpoint, with `api_key` in the query string
    ///
    /// # Errors
    /// - Returns `KlaviyoError::Http` for transport failures and timeouts
    /// - Returns `KlaviyoError::Api` for non-2xx status codes
    /// - Returns `KlaviyoError::Decode` when the body is not the expected JSON
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, KlaviyoError> {
        let request = self
            .http
            .get(self.url(path))
            .query(&[("api_key", self.private_key())])
            .query(query)
            .build()?;
        self.execute(request).await
    }

    /// PUT a private-key endpoint; the payload travels in the query string
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, KlaviyoError> {
        let request = self
            .http
            .put(self.url(path))
            .query(&[("api_key", self.private_key())])
            .query(query)
            .build()?;
        self.execute(request).await
    }

    /// POST a JSON body with `api_key` merged into it
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, KlaviyoError> {
        let body = serde_json::to_vec(&WithApiKey {
            api_key: self.private_key(),
            body,
        })?;
        let request = self
            .http
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .build()?;
        self.execute(request).await
    }

    /// DELETE with a JSON body carrying `api_key`; the response body is ignored
    pub async fn delete<B: Serialize>(&self, path: &str, body: &B) -> Result<(), KlaviyoError> {
        let body = serde_json::to_vec(&WithApiKey {
            api_key: self.private_key(),
            body,
        })?;
        let request = self
            .http
            .delete(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .build()?;
        self.send_checked(request).await?;
        Ok(())
    }

    /// GET a public endpoint and return the 2xx status with the raw body text
    pub async fn get_public(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(u16, String), KlaviyoError> {
        let request = self.http.get(self.url(path)).query(query).build()?;
        self.execute_text(request).await
    }
}

impl Service<reqwest::Request> for KlaviyoClient {
    type Response = reqwest::Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: reqwest::Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for KlaviyoClient
///
/// # Example
///
/// ```rust
/// use klaviyo_sdk::client::KlaviyoClient;
/// use klaviyo_sdk::types::{PrivateKey, PublicKey};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = KlaviyoClient::builder()
///         .public_key(PublicKey::new("AbC123")?)
///         .private_key(PrivateKey::new("pk_1234567890abcdef")?)
///         .build()?;
///
///     assert_eq!(client.public_key(), "AbC123");
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct KlaviyoClientBuilder {
    public_key: Option<PublicKey>,
    private_key: Option<PrivateKey>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl KlaviyoClientBuilder {
    /// Set the public API key
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Set the private API key
    pub fn private_key(mut self, key: PrivateKey) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Set the base URL for API calls
    ///
    /// Default: `<https://a.klaviyo.com>`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the total timeout for requests
    ///
    /// Default: 10 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 5 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the KlaviyoClient
    ///
    /// # Errors
    /// Returns an error if either key is missing or the base URL is not http(s)
    pub fn build(self) -> Result<KlaviyoClient, KlaviyoError> {
        let public_key = self
            .public_key
            .ok_or_else(|| KlaviyoError::Config("public_key is required".to_string()))?;
        let private_key = self
            .private_key
            .ok_or_else(|| KlaviyoError::Config("private_key is required".to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(KlaviyoError::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(KlaviyoClient {
            http: client,
            public_key,
            private_key,
            base_url,
            middleware_executor: None,
        })
    }
}
