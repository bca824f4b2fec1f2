//! Integration tests for account registration, login, sessions, and logout.
//!
//! Covers both credential carriers: the Bearer header and the
//! picstash_session cookie.

mod common;

use common::{login, register, register_and_login, TestHarness};
use ps_core::config::Config;

#[tokio::test]
async fn full_session_lifecycle() {
    let (_h, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    register(addr, "alice", "hunter2222").await;
    let token = login(addr, "alice", "hunter2222").await;

    let resp = client
        .get(format!("http://{addr}/api/auth/status"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["username"], "alice");

    let resp = client
        .post(format!("http://{addr}/api/auth/logout"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The token is dead after logout.
    let resp = client
        .get(format!("http://{addr}/api/auth/status"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["authenticated"], false);
}

#[tokio::test]
async fn registration_can_be_disabled() {
    let mut config = Config::default();
    config.auth.allow_registration = false;
    let (_h, addr) = TestHarness::with_server_config(config).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/auth/register"))
        .json(&serde_json::json!({"username": "alice", "password": "hunter2222"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "forbidden");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Registration is disabled"));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (_h, addr) = TestHarness::with_server().await;
    register(addr, "alice", "hunter2222").await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/auth/register"))
        .json(&serde_json::json!({"username": "alice", "password": "different9"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "conflict");
}

#[tokio::test]
async fn register_validates_credentials() {
    let (_h, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/auth/register"))
        .json(&serde_json::json!({"username": "alice", "password": "short"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("at least 8 characters"));

    for bad in ["ab", "has spaces", "punct!uation"] {
        let resp = client
            .post(format!("http://{addr}/api/auth/register"))
            .json(&serde_json::json!({"username": bad, "password": "hunter2222"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "username {bad:?} should be rejected");
    }
}

#[tokio::test]
async fn login_failures_are_uniform_401() {
    let (_h, addr) = TestHarness::with_server().await;
    register(addr, "alice", "hunter2222").await;
    let client = reqwest::Client::new();

    for (user, pass) in [("alice", "wrongpass1"), ("nobody", "hunter2222")] {
        let resp = client
            .post(format!("http://{addr}/api/auth/login"))
            .json(&serde_json::json!({"username": user, "password": pass}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("Invalid username or password"));
    }
}

#[tokio::test]
async fn anonymous_status_is_unauthenticated() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/auth/status"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["authenticated"], false);
    assert!(json.get("username").is_none() || json["username"].is_null());
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (h, addr) = TestHarness::with_server().await;
    register(addr, "alice", "hunter2222").await;

    {
        let conn = h.conn();
        let user = ps_db::queries::users::get_user_by_username(&conn, "alice")
            .unwrap()
            .unwrap();
        ps_db::queries::auth::create_token(
            &conn,
            user.id,
            "expiredtoken",
            "2000-01-01T00:00:00+00:00",
        )
        .unwrap();
    }

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/api/auth/status"))
        .header("Authorization", "Bearer expiredtoken")
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["authenticated"], false);

    let resp = client
        .post(format!("http://{addr}/images"))
        .header("Authorization", "Bearer expiredtoken")
        .header("Content-Type", "image/png")
        .body(common::TEST_PNG.to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let (_h, addr) = TestHarness::with_server().await;
    register(addr, "alice", "hunter2222").await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/auth/login"))
        .json(&serde_json::json!({"username": "alice", "password": "hunter2222"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.contains("picstash_session="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let (_h, addr) = TestHarness::with_server().await;
    let token = register_and_login(addr, "alice", "hunter2222").await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/status"))
        .header("Cookie", format!("picstash_session={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["username"], "alice");
}

#[tokio::test]
async fn bearer_header_wins_over_cookie() {
    let (_h, addr) = TestHarness::with_server().await;
    let alice = register_and_login(addr, "alice", "hunter2222").await;
    let bob = register_and_login(addr, "bob", "hunter2222").await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/status"))
        .header("Authorization", format!("Bearer {alice}"))
        .header("Cookie", format!("picstash_session={bob}"))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["username"], "alice");
}

#[tokio::test]
async fn login_returns_token_in_body() {
    let (_h, addr) = TestHarness::with_server().await;
    register(addr, "alice", "hunter2222").await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/auth/login"))
        .json(&serde_json::json!({"username": "alice", "password": "hunter2222"}))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["username"], "alice");
    assert!(!json["token"].as_str().unwrap().is_empty());
}
