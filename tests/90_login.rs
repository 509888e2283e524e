mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn login_issues_a_usable_token() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let user_id =
        common::register(&client, &server.base_url, "Ana", "Gomez", "ana@example.com", "secret1")
            .await?;
    let token = common::login(&client, &server.base_url, "ana@example.com", "secret1").await?;
    assert!(!token.is_empty());

    // The token authorizes protected routes
    let res = client
        .get(format!("{}/api/users/{}", server.base_url, user_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    common::register(&client, &server.base_url, "Ana", "Gomez", "ana@example.com", "secret1").await?;

    // Wrong password
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "ana@example.com", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Unknown email gets the same answer
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid email or password");

    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_rejected_outright() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let user_id =
        common::register(&client, &server.base_url, "Ana", "Gomez", "ana@example.com", "secret1")
            .await?;

    let res = client
        .get(format!("{}/api/users/{}", server.base_url, user_id))
        .bearer_auth("not-a-real-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
