use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request, Response};
use tower::{Layer, Service};

use crate::api::KlaviyoContext;
use crate::error::KlaviyoError;
use crate::types::{PrivateKey, PublicKey};

use super::klaviyo_client::{
    KlaviyoClient, KlaviyoClientBuilder, MiddlewareExecutor, MiddlewareFuture,
};
use super::Klaviyo;

/// Builds a [`Klaviyo`] facade, optionally wrapping the transport in a tower
/// [`Layer`].
///
/// Connection settings are forwarded to [`KlaviyoClientBuilder`].
#[must_use]
#[derive(Default)]
pub struct KlaviyoBuilder<M = ()> {
    client: KlaviyoClientBuilder,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for KlaviyoBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoBuilder")
            .field("client", &self.client)
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<M> KlaviyoBuilder<M> {
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.client = self.client.public_key(key);
        self
    }

    pub fn private_key(mut self, key: PrivateKey) -> Self {
        self.client = self.client.private_key(key);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.base_url(url);
        self
    }

    /// Upper bound for every call, connect through body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.timeout(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.connect_timeout(timeout);
        self
    }

    /// Routes every request through `middleware`, replacing any layer set
    /// earlier. Stack several with [`tower::ServiceBuilder`].
    pub fn with_middleware<L>(self, middleware: L) -> KlaviyoBuilder<L>
    where
        L: Layer<KlaviyoClient>,
    {
        KlaviyoBuilder {
            client: self.client,
            middleware: Some(middleware),
        }
    }

    pub fn build(self) -> Result<Klaviyo, KlaviyoError>
    where
        M: Layer<KlaviyoClient>,
        M::Service: Service<Request, Response = Response, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <M::Service as Service<Request>>::Future: Send + 'static,
    {
        let mut client = self.client.build()?;

        if let Some(middleware) = self.middleware {
            let service = middleware.layer(client.clone());
            let executor: MiddlewareExecutor = Arc::new(move |request: Request| -> MiddlewareFuture {
                Box::pin(service.clone().call(request))
            });
            client = client.with_middleware_executor(executor);
        }

        let context = KlaviyoContext::new(Arc::new(client));
        Ok(Klaviyo::from(Arc::new(context)))
    }
}
