//! Profile API Tests using WireMock
//!
//! These tests mock Klaviyo's profile endpoints to verify request
//! parameters and the Person encode/decode contract end to end.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use klaviyo_sdk::types::{Person, PrivateKey, PublicKey};
use klaviyo_sdk::{Klaviyo, KlaviyoError};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const PERSON_ID: &str = "01FK5337E9D68EA1FKP2FV4XFC";

/// Create a test client pointing to the mock server
fn create_test_client(mock_server: &MockServer) -> Klaviyo {
    Klaviyo::builder()
        .public_key(PublicKey::new("AbC123").unwrap())
        .private_key(PrivateKey::new("pk_test_12345").unwrap())
        .base_url(mock_server.uri())
        .build()
        .unwrap()
}

fn new_test_person() -> Person {
    let mut person = Person {
        email: "test@example.com".into(),
        first_name: "Test".into(),
        last_name: "Person".into(),
        ..Default::default()
    };
    person.attributes.insert("IsTest".into(), json!(true));
    person
}

fn person_body() -> Value {
    json!({
        "object": "person",
        "id": PERSON_ID,
        "$address1": "",
        "$address2": "",
        "$city": "Vancouver",
        "$country": "Canada",
        "$latitude": "",
        "$longitude": "",
        "$region": "BC",
        "$zip": "",
        "$email": "test@example.com",
        "$title": "",
        "$phone_number": "",
        "$organization": "",
        "$first_name": "Test",
        "$last_name": "Person",
        "$timezone": "",
        "$id": "",
        "$consent": ["email"],
        "created": "2021-10-28 18:02:11",
        "updated": "2021-10-29 09:15:00",
        "IsTest": true,
        "LikesGold": "1"
    })
}

fn decode_identify_data(request: &Request) -> Option<Value> {
    let data = request
        .url
        .query_pairs()
        .find(|(k, _)| k == "data")
        .map(|(_, v)| v.into_owned())?;
    let bytes = STANDARD.decode(data).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[tokio::test]
async fn test_identify_sends_encoded_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/identify"))
        .and(|request: &Request| {
            decode_identify_data(request).map_or(false, |payload| {
                payload["token"] == "AbC123"
                    && payload["properties"]["$email"] == "test@example.com"
                    && payload["properties"]["$first_name"] == "Test"
                    && payload["properties"]["IsTest"] == true
                    && payload["properties"].get("api_key").is_none()
            })
        })
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let person = new_test_person();
    assert!(person.has_profile_identifier());

    klaviyo.identify(&person).await.unwrap();
}

#[tokio::test]
async fn test_identify_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/identify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0"))
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let result = klaviyo.identify(&new_test_person()).await;

    assert!(matches!(result, Err(KlaviyoError::Api { status: 200, .. })));
}

#[tokio::test]
async fn test_identify_rejected_keeps_response_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/identify"))
        .respond_with(ResponseTemplate::new(202).set_body_string("0"))
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let err = klaviyo.identify(&new_test_person()).await.unwrap_err();

    assert_eq!(err.status(), Some(202));
    assert!(err.to_string().contains("identify rejected"));
}

#[tokio::test]
async fn test_get_person() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/person/{PERSON_ID}")))
        .and(query_param("api_key", "pk_test_12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(person_body()))
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let person = klaviyo.get_person(PERSON_ID).await.unwrap();

    assert_eq!(person.id, PERSON_ID);
    assert_eq!(person.object, "person");
    assert_eq!(person.email, "test@example.com");
    assert_eq!(person.city, "Vancouver");
    assert_eq!(person.created, "2021-10-28 18:02:11");

    let mut keys: Vec<&str> = person.attributes.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["IsTest", "LikesGold"]);
    assert!(person.attributes.parse_bool("IsTest"));
    assert!(person.attributes.parse_bool("LikesGold"));
}

#[tokio::test]
async fn test_get_person_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/person/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Person not found."})),
        )
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let result = klaviyo.get_person("missing").await;

    match result {
        Err(KlaviyoError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Person not found.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_person_empty_id_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let result = klaviyo.get_person("  ").await;

    assert!(matches!(result, Err(KlaviyoError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_update_person_toggles_attribute() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/person/{PERSON_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(person_body()))
        .mount(&mock_server)
        .await;

    let mut updated = person_body();
    updated["LikesGold"] = json!("false");
    Mock::given(method("PUT"))
        .and(path(format!("/api/v1/person/{PERSON_ID}")))
        .and(query_param("api_key", "pk_test_12345"))
        .and(query_param("LikesGold", "false"))
        .and(query_param("$email", "test@example.com"))
        .and(query_param("$title", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let mut person = klaviyo.get_person(PERSON_ID).await.unwrap();

    let likes_gold = !person.attributes.parse_bool("LikesGold");
    person
        .attributes
        .insert("LikesGold".into(), Value::Bool(likes_gold));

    let stored = klaviyo.update_person(&person).await.unwrap();
    assert!(stored.attributes.contains_key("LikesGold"));
    assert_eq!(stored.attributes.parse_bool("LikesGold"), likes_gold);
}

#[tokio::test]
async fn test_update_person_requires_id() {
    let mock_server = MockServer::start().await;
    let klaviyo = create_test_client(&mock_server);

    let result = klaviyo.update_person(&new_test_person()).await;

    assert!(matches!(result, Err(KlaviyoError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_get_person_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/person/{PERSON_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let klaviyo = create_test_client(&mock_server);
    let result = klaviyo.get_person(PERSON_ID).await;

    assert!(matches!(result, Err(KlaviyoError::Decode(_))));
}
