//! Klaviyo Profiles API
//!
//! Identify, fetch and update profiles.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::api::r#trait::{require_id, KlaviyoApi, KlaviyoContext};
use crate::client::KlaviyoClient;
use crate::error::KlaviyoError;
use crate::types::Person;

const IDENTIFY_PATH: &str = "/api/identify";

/// Payload of the identify endpoint, base64-encoded into `data`
#[derive(Debug, Serialize)]
struct IdentifyPayload<'a> {
    token: &'a str,
    properties: &'a Person,
}

/// Profiles API
pub struct ProfilesApi {
    context: Arc<KlaviyoContext>,
}

impl ProfilesApi {
    /// Create a new ProfilesApi instance
    pub fn new(context: Arc<KlaviyoContext>) -> Self {
        Self { context }
    }

    /// Create or update a profile through the public identify endpoint.
    ///
    /// The profile should carry an email or phone number (see
    /// [`Person::has_profile_identifier`]); the service decides what to do
    /// without one.
    ///
    /// # Errors
    /// Returns `KlaviyoError::Api` when the endpoint answers anything but `1`.
    pub async fn identify(&self, person: &Person) -> Result<(), KlaviyoError> {
        let client = self.context.client();
        let payload = IdentifyPayload {
            token: client.public_key(),
            properties: person,
        };
        let data = STANDARD.encode(serde_json::to_vec(&payload)?);

        debug!("[Klaviyo] identify profile id={:?}", person.id);
        let (status, body) = client
            .get_public(IDENTIFY_PATH, &[("data", data.as_str())])
            .await?;

        match body.trim() {
            "1" => Ok(()),
            other => Err(KlaviyoError::Api {
                status,
                message: format!("identify rejected the profile (response {other:?})"),
            }),
        }
    }

    /// Fetch one profile by Klaviyo id
    pub async fn get_person(&self, person_id: &str) -> Result<Person, KlaviyoError> {
        require_id("person_id", person_id)?;

        let path = person_path(person_id);
        debug!("[Klaviyo] get person {}", person_id);
        self.context.client().get(&path, &[]).await
    }

    /// Overwrite a profile with every fixed field and attribute of `person`.
    ///
    /// Returns the profile as stored by the service after the update.
    pub async fn update_person(&self, person: &Person) -> Result<Person, KlaviyoError> {
        require_id("person.id", &person.id)?;

        let path = person_path(&person.id);
        let params = update_params(person);
        let query: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        debug!(
            "[Klaviyo] update person {} ({} properties)",
            person.id,
            query.len()
        );
        self.context.client().put(&path, &query).await
    }
}

impl KlaviyoApi for ProfilesApi {
    fn context(&self) -> &KlaviyoContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "profiles"
    }
}

fn person_path(person_id: &str) -> String {
    format!("/api/v1/person/{}", KlaviyoClient::encode_segment(person_id))
}

/// Query parameters for the v1 person update, one per merged property.
fn update_params(person: &Person) -> Vec<(String, String)> {
    person
        .to_map()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}
