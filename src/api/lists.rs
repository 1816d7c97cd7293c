//! Klaviyo Lists API
//!
//! List enumeration, membership checks, subscribe and unsubscribe.
//!
//! Every call takes identifier slices (emails, phone numbers, push tokens);
//! empty slices are left out of the request entirely.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::api::r#trait::{require_id, KlaviyoApi, KlaviyoContext};
use crate::client::KlaviyoClient;
use crate::error::KlaviyoError;
use crate::types::{List, ListInfo, ListPerson, Marker, MembersPage};

/// A profile to opt into a list, `{"email": ...}` or `{"phone_number": ...}`
#[derive(Debug, Serialize, PartialEq, Eq)]
enum SubscribeProfile<'a> {
    #[serde(rename = "email")]
    Email(&'a str),
    #[serde(rename = "phone_number")]
    PhoneNumber(&'a str),
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    profiles: Vec<SubscribeProfile<'a>>,
}

#[derive(Debug, Serialize)]
struct UnsubscribeRequest<'a> {
    #[serde(skip_serializing_if = "is_empty")]
    emails: &'a [&'a str],
    #[serde(skip_serializing_if = "is_empty")]
    phone_numbers: &'a [&'a str],
    #[serde(skip_serializing_if = "is_empty")]
    push_tokens: &'a [&'a str],
}

/// Lists API
pub struct ListsApi {
    context: Arc<KlaviyoContext>,
}

impl ListsApi {
    /// Create a new ListsApi instance
    pub fn new(context: Arc<KlaviyoContext>) -> Self {
        Self { context }
    }

    /// Enumerate every list in the account
    pub async fn get_lists(&self) -> Result<Vec<List>, KlaviyoError> {
        debug!("[Klaviyo] get lists");
        self.context.client().get("/api/v2/lists", &[]).await
    }

    /// Fetch metadata for one list
    pub async fn get_list_info(&self, list_id: &str) -> Result<ListInfo, KlaviyoError> {
        require_id("list_id", list_id)?;

        debug!("[Klaviyo] get list info {}", list_id);
        self.context.client().get(&list_path(list_id), &[]).await
    }

    /// Check which of the given identifiers are members of a list.
    ///
    /// Only members come back; identifiers that are not on the list are
    /// silently absent from the result.
    pub async fn in_list(
        &self,
        list_id: &str,
        emails: &[&str],
        phone_numbers: &[&str],
        push_tokens: &[&str],
    ) -> Result<Vec<ListPerson>, KlaviyoError> {
        require_id("list_id", list_id)?;
        require_identifiers(emails, phone_numbers, push_tokens)?;

        let query: Vec<(&str, &str)> = emails
            .iter()
            .map(|e| ("emails", *e))
            .chain(phone_numbers.iter().map(|p| ("phone_numbers", *p)))
            .chain(push_tokens.iter().map(|t| ("push_tokens", *t)))
            .collect();

        debug!(
            "[Klaviyo] check {} identifiers against list {}",
            query.len(),
            list_id
        );
        let path = format!("{}/members", list_path(list_id));
        self.context.client().get(&path, &query).await
    }

    /// Opt emails and phone numbers into a list.
    ///
    /// On a double opt-in list nobody is a member until they confirm, so the
    /// result is empty.
    pub async fn subscribe(
        &self,
        list_id: &str,
        emails: &[&str],
        phone_numbers: &[&str],
    ) -> Result<Vec<ListPerson>, KlaviyoError> {
        require_id("list_id", list_id)?;
        require_identifiers(emails, phone_numbers, &[])?;

        let request = SubscribeRequest {
            profiles: subscribe_profiles(emails, phone_numbers),
        };

        debug!(
            "[Klaviyo] subscribe {} profiles to list {}",
            request.profiles.len(),
            list_id
        );
        let path = format!("{}/subscribe", list_path(list_id));
        self.context.client().post(&path, &request).await
    }

    /// Remove identifiers from a list
    pub async fn unsubscribe(
        &self,
        list_id: &str,
        emails: &[&str],
        phone_numbers: &[&str],
        push_tokens: &[&str],
    ) -> Result<(), KlaviyoError> {
        require_id("list_id", list_id)?;
        require_identifiers(emails, phone_numbers, push_tokens)?;

        let request = UnsubscribeRequest {
            emails,
            phone_numbers,
            push_tokens,
        };

        debug!("[Klaviyo] unsubscribe from list {}", list_id);
        let path = format!("{}/subscribe", list_path(list_id));
        self.context.client().delete(&path, &request).await
    }

    /// Fetch one page of members of a list or segment.
    ///
    /// Pass `None` for the first page, then the previous page's marker.
    pub async fn get_list_and_segment_members(
        &self,
        group_id: &str,
        marker: Option<&Marker>,
    ) -> Result<MembersPage, KlaviyoError> {
        require_id("group_id", group_id)?;

        let marker = marker.map(Marker::as_query_value);
        let query: Vec<(&str, &str)> = marker
            .as_deref()
            .map(|m| vec![("marker", m)])
            .unwrap_or_default();

        debug!(
            "[Klaviyo] get members of {} (marker={:?})",
            group_id, marker
        );
        let path = format!(
            "/api/v2/group/{}/members/all",
            KlaviyoClient::encode_segment(group_id)
        );
        self.context.client().get(&path, &query).await
    }
}

impl KlaviyoApi for ListsApi {
    fn context(&self) -> &KlaviyoContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "lists"
    }
}

fn list_path(list_id: &str) -> String {
    format!("/api/v2/list/{}", KlaviyoClient::encode_segment(list_id))
}

fn require_identifiers(
    emails: &[&str],
    phone_numbers: &[&str],
    push_tokens: &[&str],
) -> Result<(), KlaviyoError> {
    if emails.is_empty() && phone_numbers.is_empty() && push_tokens.is_empty() {
        return Err(KlaviyoError::InvalidArgument(
            "at least one email, phone number or push token is required".to_string(),
        ));
    }
    Ok(())
}

fn is_empty(values: &&[&str]) -> bool {
    values.is_empty()
}

fn subscribe_profiles<'a>(
    emails: &[&'a str],
    phone_numbers: &[&'a str],
) -> Vec<SubscribeProfile<'a>> {
    emails
        .iter()
        .map(|e| SubscribeProfile::Email(*e))
        .chain(phone_numbers.iter().map(|p| SubscribeProfile::PhoneNumber(*p)))
        .collect()
}
