//! Klaviyo SDK for Rust
//!
//! A typed client for Klaviyo's profile and list APIs. Every operation is a
//! single HTTP request whose JSON response is decoded into typed results.
//!
//! ## API Coverage
//!
//! | Category | Operations |
//! |----------|-----------|
//! | Profiles | `identify`, `get_person`, `update_person` |
//! | Lists | `get_lists`, `get_list_info`, `get_list_and_segment_members` |
//! | Membership | `in_list`, `subscribe`, `unsubscribe` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use klaviyo_sdk::{Klaviyo, types::{PrivateKey, PublicKey}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let klaviyo = Klaviyo::builder()
//!         .public_key(PublicKey::new("AbC123")?)
//!         .private_key(PrivateKey::new("pk_...")?)
//!         .build()?;
//!
//!     let mut person = klaviyo.get_person("01FK5337E9D68EA1FKP2FV4XFC").await?;
//!     let likes_gold = person.attributes.parse_bool("LikesGold");
//!     person.attributes.insert("LikesGold".into(), (!likes_gold).into());
//!     klaviyo.update_person(&person).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Klaviyo API modules (profiles, lists)
//! - [`client`] - HTTP client and the [`Klaviyo`] facade
//! - [`error`] - Error types
//! - [`middleware`] - Tower middleware (request logging)
//! - [`types`] - Profiles, lists and credentials
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use klaviyo_sdk::KlaviyoError;
//!
//! match result {
//!     Ok(person) => { /* handle success */ }
//!     Err(KlaviyoError::Api { status, message }) => {
//!         eprintln!("API error: {} - {}", status, message);
//!     }
//!     Err(e) if e.is_timeout() => {
//!         eprintln!("Klaviyo did not answer in time");
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod middleware;
pub mod types;

pub use client::{Klaviyo, KlaviyoBuilder, KlaviyoClient, KlaviyoClientBuilder};
pub use error::KlaviyoError;
pub use types::{Attributes, List, ListInfo, ListPerson, Marker, MembersPage, Person};
