//! Klaviyo API trait and context
//!
//! Provides the base trait and context for all Klaviyo API implementations.

use std::sync::Arc;

use crate::client::KlaviyoClient;
use crate::error::KlaviyoError;

/// Context holding shared resources for Klaviyo API implementations.
#[derive(Clone)]
pub struct KlaviyoContext {
    /// The Klaviyo HTTP client for making API requests
    pub(crate) client: Arc<KlaviyoClient>,
}

impl std::fmt::Debug for KlaviyoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoContext")
            .field("client", &"KlaviyoClient { .. }")
            .finish()
    }
}

impl KlaviyoContext {
    /// Create a new KlaviyoContext
    pub fn new(client: Arc<KlaviyoClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the Klaviyo HTTP client.
    pub fn client(&self) -> &KlaviyoClient {
        &self.client
    }
}

/// Trait for Klaviyo API implementations.
pub trait KlaviyoApi: Send + Sync {
    /// Get a reference to the Klaviyo context
    fn context(&self) -> &KlaviyoContext;

    /// Get the name of this API for logging and error context.
    fn api_name(&self) -> &'static str {
        "unknown"
    }
}

/// Rejects an empty or whitespace-only identifier before any request is made.
pub(crate) fn require_id(name: &str, value: &str) -> Result<(), KlaviyoError> {
    if value.trim().is_empty() {
        return Err(KlaviyoError::InvalidArgument(format!(
            "{name} must not be empty"
        )));
    }
    Ok(())
}
