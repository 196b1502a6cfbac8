mod common;

use axum::http::StatusCode;
use axum::Router;
use migration::{Migrator, MigratorTrait};
use serde_json::json;

use game_rater_api::auth::jwt;
use game_rater_api::config::{Config, Environment};
use game_rater_api::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Test Infrastructure
// ─────────────────────────────────────────────────────────────────────────────

const JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_access_expiration_secs: 900,
        frontend_url: "http://localhost:3001".to_string(),
        upload_dir: std::env::temp_dir()
            .join(format!("game-rater-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
    }
}

async fn test_app() -> Router {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .unwrap_or_default();
    Migrator::up(&db, None).await.unwrap_or_default();

    let state = AppState {
        db,
        config: test_config(),
    };

    game_rater_api::routes::router().with_state(state)
}

fn token_for(user_id: i32) -> String {
    jwt::generate_access_token(user_id, JWT_SECRET, 900).unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity Resolution
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_profile_without_token() {
    let app = test_app().await;

    let (status, body) = common::get(&app, "/profile").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert!(v["message"].is_string());
}

#[tokio::test]
async fn get_profile_with_garbage_token() {
    let app = test_app().await;

    let (status, _) = common::get_with_auth(&app, "/profile", "not-a-jwt").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_profile_with_wrong_secret_token() {
    let app = test_app().await;

    let token =
        jwt::generate_access_token(1, "some-other-secret-entirely-32chars!", 900).unwrap_or_default();
    let (status, _) = common::get_with_auth(&app, "/profile", &token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_without_profile_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = common::get_with_auth(&app, "/profile", &token_for(7)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile CRUD
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_profile_then_get() {
    let app = test_app().await;
    let token = token_for(7);

    let (status, body) = common::post_json_with_auth(
        &app,
        "/profile",
        &json!({ "bio": "Euro games over Ameritrash." }),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert!(v["id"].is_i64());
    assert_eq!(v["userId"], 7);
    assert_eq!(v["bio"], "Euro games over Ameritrash.");

    let (status, body) = common::get_with_auth(&app, "/profile", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert_eq!(v["bio"], "Euro games over Ameritrash.");
}

#[tokio::test]
async fn create_profile_twice_is_rejected() {
    let app = test_app().await;
    let token = token_for(7);

    let (status, _) =
        common::post_json_with_auth(&app, "/profile", &json!({ "bio": "First." }), &token).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        common::post_json_with_auth(&app, "/profile", &json!({ "bio": "Second." }), &token).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
}

#[tokio::test]
async fn create_profile_bio_too_long() {
    let app = test_app().await;

    let (status, body) = common::post_json_with_auth(
        &app,
        "/profile",
        &json!({ "bio": "x".repeat(151) }),
        &token_for(7),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert!(v["reason"].is_string());
}

#[tokio::test]
async fn update_profile_bio() {
    let app = test_app().await;
    let token = token_for(7);

    let (status, _) =
        common::post_json_with_auth(&app, "/profile", &json!({ "bio": "Old bio." }), &token).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        common::put_json_with_auth(&app, "/profile", &json!({ "bio": "New bio." }), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{body}");

    let (_, body) = common::get_with_auth(&app, "/profile", &token).await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert_eq!(v["bio"], "New bio.");
}
