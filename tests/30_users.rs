mod common;

use anyhow::Result;
use serde_json::{json, Value};

fn user(username: &str) -> Value {
    json!({
        "username": username,
        "first_name": "Ioana",
        "last_name": "Marin",
        "birthday": "1995-09-30",
        "location": "Timisoara",
        "interests": ["science", "football"],
        "password": "correct horse"
    })
}

#[tokio::test]
async fn user_lifecycle() -> Result<()> {
    let base = common::default_app().await?;
    let client = reqwest::Client::new();
    let users = format!("{}/api/v1/users", base);

    let created = common::envelope(client.post(&users).json(&json!({ "user_info": user("ioana") }))).await?;
    assert_eq!(created.code, 200);
    assert_eq!(common::str_field(&created, "user_id"), "ioana");

    let fetched = common::envelope(client.get(&users).query(&[("user_id", "ioana")])).await?;
    let info = fetched.get("user_info").unwrap();
    assert_eq!(info["location"], "Timisoara");
    assert_eq!(info["is_admin"], false);
    assert_eq!(info["viewed_articles"], json!([]));
    let hash = info["password"].as_str().unwrap();
    assert_ne!(hash, "correct horse");
    assert!(echofeed::auth::verify_password("correct horse", hash)?);

    let updated = common::envelope(client.put(&users).json(&json!({
        "user_id": "ioana",
        "user_info": { "liked_articles": ["a1", "a2"] }
    })))
    .await?;
    assert_eq!(updated.code, 200);

    let fetched = common::envelope(client.get(&users).query(&[("user_id", "ioana")])).await?;
    let info = fetched.get("user_info").unwrap();
    assert_eq!(info["liked_articles"], json!(["a1", "a2"]));
    assert_eq!(info["first_name"], "Ioana");

    let deleted = common::envelope(client.delete(&users).query(&[("user_id", "ioana")])).await?;
    assert_eq!(deleted.code, 200);

    let gone = common::envelope(client.get(&users).query(&[("user_id", "ioana")])).await?;
    assert_eq!(gone.code, 404);
    assert_eq!(gone.message, "User with id ioana not found");
    assert_eq!(gone.get("user_info"), Some(&Value::Null));
    Ok(())
}

#[tokio::test]
async fn same_password_hashes_differently() -> Result<()> {
    let base = common::default_app().await?;
    let client = reqwest::Client::new();
    let users = format!("{}/api/v1/users", base);

    for name in ["first", "second"] {
        common::envelope(client.post(&users).json(&json!({ "user_info": user(name) }))).await?;
    }

    let both = common::envelope(
        client
            .post(format!("{}/list", users))
            .json(&json!({ "ids_list": ["first", "second"] })),
    )
    .await?;
    let map = both.get("users_info").and_then(Value::as_object).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["first", "second"]);

    let first = map["first"]["password"].as_str().unwrap();
    let second = map["second"]["password"].as_str().unwrap();
    assert_ne!(first, second);
    assert!(echofeed::auth::verify_password("correct horse", first)?);
    assert!(echofeed::auth::verify_password("correct horse", second)?);
    Ok(())
}

#[tokio::test]
async fn duplicate_and_invalid_usernames() -> Result<()> {
    let base = common::default_app().await?;
    let client = reqwest::Client::new();
    let users = format!("{}/api/v1/users", base);

    common::envelope(client.post(&users).json(&json!({ "user_info": user("taken") }))).await?;
    let duplicate = common::envelope(client.post(&users).json(&json!({ "user_info": user("taken") }))).await?;
    assert_eq!(duplicate.code, 409);
    assert_eq!(duplicate.get("user_id"), Some(&Value::Null));

    let invalid = common::envelope(client.post(&users).json(&json!({ "user_info": user("no spaces") }))).await?;
    assert_eq!(invalid.code, 400);

    let all = common::envelope(client.get(format!("{}/all", users))).await?;
    let list = all.get("users_info").and_then(Value::as_array).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["user_id"], "taken");
    Ok(())
}

#[tokio::test]
async fn unknown_id_in_list_fails_the_lookup() -> Result<()> {
    let base = common::default_app().await?;
    let client = reqwest::Client::new();
    let users = format!("{}/api/v1/users", base);

    common::envelope(client.post(&users).json(&json!({ "user_info": user("known") }))).await?;
    let response = common::envelope(
        client
            .post(format!("{}/list", users))
            .json(&json!({ "ids_list": ["known", "unknown"] })),
    )
    .await?;
    assert_eq!(response.code, 404);
    assert_eq!(response.message, "User with id unknown not found");
    Ok(())
}
