//! Unified Klaviyo client

use std::sync::Arc;

use crate::api::lists::ListsApi;
use crate::api::profiles::ProfilesApi;
use crate::api::KlaviyoContext;
use crate::error::KlaviyoError;
use crate::types::{List, ListInfo, ListPerson, Marker, MembersPage, Person};

/// Unified Klaviyo client
///
/// This is the main entry point for the SDK. Every method performs exactly
/// one HTTP call. The client is cheap to clone and safe to share between
/// tasks.
///
/// # Example
///
/// ```rust,ignore
/// use klaviyo_sdk::Klaviyo;
/// use klaviyo_sdk::types::{PrivateKey, PublicKey};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let klaviyo = Klaviyo::builder()
///         .public_key(PublicKey::new("AbC123")?)
///         .private_key(PrivateKey::new("pk_...")?)
///         .build()?;
///
///     for list in klaviyo.get_lists().await? {
///         println!("{} {}", list.list_id, list.list_name);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Klaviyo {
    context: Arc<KlaviyoContext>,
}

impl std::fmt::Debug for Klaviyo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Klaviyo")
            .field("client", self.context.client())
            .finish()
    }
}

impl From<Arc<KlaviyoContext>> for Klaviyo {
    fn from(context: Arc<KlaviyoContext>) -> Self {
        Self { context }
    }
}

impl Klaviyo {
    pub fn builder() -> super::builder::KlaviyoBuilder {
        super::builder::KlaviyoBuilder::default()
    }

    pub fn public_key(&self) -> &str {
        self.context.client().public_key()
    }

    // Profiles API

    pub async fn identify(&self, person: &Person) -> Result<(), KlaviyoError> {
        ProfilesApi::new(self.context.clone())
            .identify(person)
            .await
    }

    pub async fn get_person(&self, person_id: &str) -> Result<Person, KlaviyoError> {
        ProfilesApi::new(self.context.clone())
            .get_person(person_id)
            .await
    }

    pub async fn update_person(&self, person: &Person) -> Result<Person, KlaviyoError> {
        ProfilesApi::new(self.context.clone())
            .update_person(person)
            .await
    }

    // Lists API

    pub async fn get_lists(&self) -> Result<Vec<List>, KlaviyoError> {
        ListsApi::new(self.context.clone()).get_lists().await
    }

    pub async fn get_list_info(&self, list_id: &str) -> Result<ListInfo, KlaviyoError> {
        ListsApi::new(self.context.clone())
            .get_list_info(list_id)
            .await
    }

    pub async fn in_list(
        &self,
        list_id: &str,
        emails: &[&str],
        phone_numbers: &[&str],
        push_tokens: &[&str],
    ) -> Result<Vec<ListPerson>, KlaviyoError> {
        ListsApi::new(self.context.clone())
            .in_list(list_id, emails, phone_numbers, push_tokens)
            .await
    }

    pub async fn subscribe(
        &self,
        list_id: &str,
        emails: &[&str],
        phone_numbers: &[&str],
    ) -> Result<Vec<ListPerson>, KlaviyoError> {
        ListsApi::new(self.context.clone())
            .subscribe(list_id, emails, phone_numbers)
            .await
    }

    pub async fn unsubscribe(
        &self,
        list_id: &str,
        emails: &[&str],
        phone_numbers: &[&str],
        push_tokens: &[&str],
    ) -> Result<(), KlaviyoError> {
        ListsApi::new(self.context.clone())
            .unsubscribe(list_id, emails, phone_numbers, push_tokens)
            .await
    }

    pub async fn get_list_and_segment_members(
        &self,
        group_id: &str,
        marker: Option<&Marker>,
    ) -> Result<MembersPage, KlaviyoError> {
        ListsApi::new(self.context.clone())
            .get_list_and_segment_members(group_id, marker)
            .await
    }
}
