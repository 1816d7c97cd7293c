//! Middleware components for the Klaviyo SDK.
//!
//! Middleware wraps the HTTP transport using Tower patterns and is installed
//! with [`KlaviyoBuilder::with_middleware`](crate::client::KlaviyoBuilder::with_middleware).
//!
//! - [`LoggingMiddleware`] - Logs request/response information
//!
//! ## Usage
//!
//! ```ignore
//! use klaviyo_sdk::{middleware::LoggingMiddleware, Klaviyo};
//!
//! let klaviyo = Klaviyo::builder()
//!     .public_key(public_key)
//!     .private_key(private_key)
//!     .with_middleware(LoggingMiddleware::new().verbose())
//!     .build()?;
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::LoggingMiddleware;
