//! Klaviyo API modules
//!
//! - [`profiles`] - Identify, fetch and update profiles
//! - [`lists`] - List enumeration, membership, subscribe and unsubscribe

pub mod lists;
pub mod profiles;
pub mod r#trait;

pub use lists::ListsApi;
pub use profiles::ProfilesApi;
pub use r#trait::{KlaviyoApi, KlaviyoContext};
