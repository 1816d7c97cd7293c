//! Toggle a custom attribute on a profile and check list membership.
//!
//! Reads credentials from `KLAVIYO_PUBLIC_KEY`, `KLAVIYO_PRIVATE_KEY`,
//! `KLAVIYO_PERSON_ID` and `KLAVIYO_LIST_ID`.

use std::time::Duration;

use klaviyo_sdk::middleware::LoggingMiddleware;
use klaviyo_sdk::types::{PrivateKey, PublicKey};
use klaviyo_sdk::Klaviyo;

const ATTR_LIKES_GOLD: &str = "LikesGold";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let klaviyo = Klaviyo::builder()
        .public_key(PublicKey::new(std::env::var("KLAVIYO_PUBLIC_KEY")?)?)
        .private_key(PrivateKey::new(std::env::var("KLAVIYO_PRIVATE_KEY")?)?)
        .timeout(Duration::from_secs(10))
        .with_middleware(LoggingMiddleware::new())
        .build()?;

    let person_id = std::env::var("KLAVIYO_PERSON_ID")?;
    let mut person = klaviyo.get_person(&person_id).await?;

    let likes_gold = !person.attributes.parse_bool(ATTR_LIKES_GOLD);
    person
        .attributes
        .insert(ATTR_LIKES_GOLD.to_string(), likes_gold.into());
    klaviyo.update_person(&person).await?;
    println!("{} now has {} = {}", person.email, ATTR_LIKES_GOLD, likes_gold);

    let list_id = std::env::var("KLAVIYO_LIST_ID")?;
    let info = klaviyo.get_list_info(&list_id).await?;
    let members = klaviyo
        .in_list(&list_id, &[person.email.as_str()], &[], &[])
        .await?;
    println!(
        "{} on list {:?}: {}",
        person.email,
        info.list_name,
        !members.is_empty()
    );

    Ok(())
}
