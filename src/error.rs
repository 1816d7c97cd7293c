use thiserror::Error;

/// Klaviyo SDK error types
#[derive(Debug, Error)]
pub enum KlaviyoError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Klaviyo API error (status={status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl KlaviyoError {
    /// Returns true when the request exceeded the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, KlaviyoError::Http(e) if e.is_timeout())
    }

    /// HTTP status reported by the remote service, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            KlaviyoError::Api { status, .. } => Some(*status),
            KlaviyoError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Builds an `Api` error from a non-success response body.
    ///
    /// Klaviyo reports failures as `{"detail": ...}` on v1 endpoints and
    /// `{"message": ...}` on v2; anything else is passed through verbatim.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("detail")
                    .or_else(|| value.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    "unknown error".to_string()
                } else {
                    body.trim().to_string()
                }
            });

        KlaviyoError::Api { status, message }
    }
}
