//! Klaviyo HTTP Client module
//!
//! This module contains the KlaviyoClient transport and the Klaviyo facade.

mod klaviyo_client;
pub use klaviyo_client::{KlaviyoClient, KlaviyoClientBuilder};

mod klaviyo;
pub use klaviyo::Klaviyo;

mod builder;
pub use builder::KlaviyoBuilder;
