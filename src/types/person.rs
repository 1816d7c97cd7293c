//! Klaviyo profile entity
//!
//! On the wire a profile is a single flat JSON object. Klaviyo's own fields
//! use `$`-prefixed keys (`$email`, `$first_name`, ...) next to the unprefixed
//! `id`, `object`, `created` and `updated`; every other key is a custom
//! property. [`Person`] splits that object into typed fixed fields plus an
//! [`Attributes`] bag, and merges them back when encoding.
//!
//! ```rust
//! use klaviyo_sdk::types::Person;
//!
//! let json = r#"{"id": "01ABC", "object": "person", "$email": "a@b.co", "LikesGold": "1"}"#;
//! let person: Person = serde_json::from_str(json).unwrap();
//! assert_eq!(person.email, "a@b.co");
//! assert!(person.attributes.parse_bool("LikesGold"));
//! assert!(!person.attributes.contains_key("$email"));
//! ```

use std::ops::{Deref, DerefMut};

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix Klaviyo reserves for its own profile properties.
pub const RESERVED_PREFIX: char = '$';

/// Custom profile properties not known in advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-effort boolean read.
    ///
    /// Only boolean `true` and the strings `"true"` and `"1"` count as true.
    /// A missing key, a number, null or any other string reads as `false`.
    pub fn parse_bool(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true" || s == "1",
            _ => false,
        }
    }

    /// String value of `key`, if it holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Attributes {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Attributes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

macro_rules! person_fields {
    ($( $(#[$doc:meta])* $field:ident => $wire:literal, )+) => {
        /// A Klaviyo profile.
        ///
        /// Fixed fields are always encoded, empty ones as `""`. Custom
        /// properties live in [`attributes`](Person::attributes).
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Person {
            $( $(#[$doc])* pub $field: String, )+
            /// Custom properties.
            pub attributes: Attributes,
        }

        impl Person {
            /// Wire keys of every fixed field, in encoding order.
            pub const FIXED_KEYS: &'static [&'static str] = &[$($wire),+];

            fn fixed_fields(&self) -> Vec<(&'static str, &str)> {
                vec![$(($wire, self.$field.as_str())),+]
            }

            fn fixed_field_mut(&mut self, key: &str) -> Option<&mut String> {
                match key {
                    $($wire => Some(&mut self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

person_fields! {
    /// Klaviyo's profile id
    id => "id",
    /// Object kind, `"person"` on profiles returned by the API
    object => "object",
    address1 => "$address1",
    address2 => "$address2",
    city => "$city",
    country => "$country",
    latitude => "$latitude",
    longitude => "$longitude",
    region => "$region",
    zip => "$zip",
    email => "$email",
    title => "$title",
    phone_number => "$phone_number",
    organization => "$organization",
    first_name => "$first_name",
    last_name => "$last_name",
    timezone => "$timezone",
    /// External customer id
    customer_id => "$id",
    created => "created",
    updated => "updated",
}

impl Person {
    /// A profile identifier is an email or phone number. SMS needs the latter.
    pub fn has_profile_identifier(&self) -> bool {
        !(self.email.trim().is_empty() && self.phone_number.trim().is_empty())
    }

    /// Returns true for keys that never become custom attributes.
    pub fn is_reserved_key(key: &str) -> bool {
        key.starts_with(RESERVED_PREFIX) || Self::FIXED_KEYS.contains(&key)
    }

    /// Flattens the profile into one JSON object.
    ///
    /// Attributes go in first and fixed fields overwrite them, so a custom
    /// property named like a fixed field never reaches the wire.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.attributes.0.clone();
        for (key, value) in self.fixed_fields() {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        map
    }

    /// Builds a profile from a decoded JSON object.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, String> {
        let mut person = Person::default();

        for (key, value) in map {
            if let Some(slot) = person.fixed_field_mut(&key) {
                *slot = fixed_value(&key, value)?;
                continue;
            }
            // Unknown `$` keys are Klaviyo's too.
            if Self::is_reserved_key(&key) {
                continue;
            }
            person.attributes.insert(key, value);
        }

        Ok(person)
    }
}

/// Scalars the service sends unquoted (coordinates, zips) keep their JSON text.
fn fixed_value(key: &str, value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err(format!(
            "invalid type for profile field `{key}`: expected a string"
        )),
    }
}

impl Serialize for Person {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fixed = self.fixed_fields();
        let custom: Vec<_> = self
            .attributes
            .iter()
            .filter(|(key, _)| !Self::FIXED_KEYS.contains(&key.as_str()))
            .collect();

        let mut map = serializer.serialize_map(Some(custom.len() + fixed.len()))?;
        for (key, value) in custom {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in fixed {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Person {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Person::from_map(map).map_err(de::Error::custom)
    }
}
