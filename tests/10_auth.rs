mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_route_without_credentials_is_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/messages")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    common::assert_cors(&res);

    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "error": "Authentication required" }));
    Ok(())
}

#[tokio::test]
async fn non_admin_token_is_forbidden() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/artworks"))
        .bearer_auth(server.user_token())
        .json(&json!({ "title": "Dusk", "artist": "Wanjiru", "price": 1200 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Admin privileges required");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/messages"))
        .bearer_auth(server.expired_token())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Token expired");
    Ok(())
}

#[tokio::test]
async fn malformed_and_forged_credentials_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/messages"))
        .header("Authorization", "Bearer")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["error"], "Malformed authorization header");

    let res = client
        .get(server.url("/messages"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let message = res.json::<Value>().await?["error"].as_str().unwrap_or_default().to_string();
    assert!(message.starts_with("Invalid token"), "unexpected message: {}", message);
    Ok(())
}

#[tokio::test]
async fn admin_login_grants_admin_routes() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/admin/login"))
        .json(&json!({ "email": common::ADMIN_EMAIL, "password": common::ADMIN_PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["admin"]["isAdmin"], true);
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let res = client
        .get(server.url("/messages"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "messages": [] }));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/admin/login"))
        .json(&json!({ "email": common::ADMIN_EMAIL, "password": "guess" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["error"], "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn registered_user_can_log_in_but_not_administer() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/register"))
        .json(&json!({ "name": "Amani", "email": "amani@example.com", "password": "pw1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?["user"]["email"], "amani@example.com");

    let res = client
        .post(server.url("/login"))
        .json(&json!({ "email": "amani@example.com", "password": "pw1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let token = res.json::<Value>().await?["token"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let res = client
        .get(server.url("/messages"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn register_reports_missing_and_duplicate() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/register"))
        .json(&json!({ "name": "Amani", "email": "amani@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "error": "Missing required fields: password" })
    );

    let account = json!({ "name": "Amani", "email": "amani@example.com", "password": "pw" });
    let first = client.post(server.url("/register")).json(&account).send().await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(server.url("/register")).json(&account).send().await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(second.json::<Value>().await?["error"], "Email already registered");
    Ok(())
}
