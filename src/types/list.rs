use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A list as returned by list enumeration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct List {
    pub list_id: String,
    #[serde(default)]
    pub list_name: String,
}

impl List {
    pub fn new(list_id: impl Into<String>, list_name: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            list_name: list_name.into(),
        }
    }
}

/// Metadata for a single list
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ListInfo {
    #[serde(default)]
    pub list_name: String,
    /// Folder the list is filed under, if any
    #[serde(default)]
    pub folder: Option<String>,
    /// `single_opt_in` or `double_opt_in`
    #[serde(default)]
    pub opt_in_process: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Any other keys the service returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListInfo {
    /// Whether new subscribers must confirm before they become members.
    pub fn is_double_opt_in(&self) -> bool {
        self.opt_in_process.as_deref() == Some("double_opt_in")
    }
}

/// A profile's membership record within a list
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ListPerson {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub push_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created: String,
}

impl ListPerson {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Opaque continuation token for member listing.
///
/// Pass it back unchanged to fetch the following page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Marker(Value);

impl Marker {
    /// Query string form of the marker.
    pub fn as_query_value(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Value> for Marker {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One page of list or segment members
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct MembersPage {
    #[serde(default)]
    pub records: Vec<ListPerson>,
    /// Absent on the last page
    #[serde(default)]
    pub marker: Option<Marker>,
}

impl MembersPage {
    pub fn has_more(&self) -> bool {
        self.marker.is_some()
    }
}
