mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_reports_store() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], 200);
    assert_eq!(body["result"], true);
    assert_eq!(body["store"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let server = common::spawn_server().await?;
    let body = reqwest::get(format!("{}/", server.base_url))
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["name"], "EchoFeed API");
    assert!(body["endpoints"]["articles"].is_string());
    Ok(())
}

#[tokio::test]
async fn binary_serves_envelopes() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let missing = common::envelope(
        client.get(format!("{}/api/v1/users?user_id=nobody-here", server.base_url)),
    )
    .await?;
    assert_eq!(missing.code, 404);
    assert_eq!(missing.get("user_info"), Some(&serde_json::Value::Null));

    // Validation runs before any content helper is called
    let invalid = common::envelope(
        client
            .post(format!("{}/api/v1/articles/keywords", server.base_url))
            .json(&json!({ "user_input": "", "language": "en" })),
    )
    .await?;
    assert_eq!(invalid.code, 400);
    Ok(())
}

#[tokio::test]
async fn dropping_the_server_stops_the_binary() -> Result<()> {
    let server = common::spawn_server().await?;
    let health = format!("{}/health", server.base_url);
    assert!(reqwest::get(&health).await.is_ok());

    drop(server);
    assert!(reqwest::get(&health).await.is_err());
    Ok(())
}
