mod common;

use axum::http::StatusCode;
use axum::Router;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use serde_json::json;

use game_rater_api::auth::jwt;
use game_rater_api::config::{Config, Environment};
use game_rater_api::entities::rater;
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

async fn test_app() -> (Router, DatabaseConnection) {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .unwrap_or_default();
    Migrator::up(&db, None).await.unwrap_or_default();

    let state = AppState {
        db: db.clone(),
        config: test_config(),
    };

    (game_rater_api::routes::router().with_state(state), db)
}

async fn rater_with_token(db: &DatabaseConnection, user_id: i32) -> (i32, String) {
    let now = chrono::Utc::now();
    let inserted = rater::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        bio: ActiveValue::Set("Reviews everything".to_string()),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await;

    let rater_id = inserted.map(|r| r.id).unwrap_or_default();
    let token = jwt::generate_access_token(user_id, JWT_SECRET, 900).unwrap_or_default();
    (rater_id, token)
}

async fn create_game(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = common::post_json_with_auth(
        app,
        "/games",
        &json!({
            "title": title,
            "description": "Trading game",
            "yearReleased": 1995,
            "numberOfPlayers": 4,
            "estimatedTime": "01:00:00",
            "ageRecommendation": 10,
        }),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create game failed: {body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    v["id"].as_i64().unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Create Review
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_review_success() {
    let (app, db) = test_app().await;
    let (rater_id, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (status, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "Still holds up after thirty years." }),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert!(v["id"].is_i64());
    assert_eq!(v["gameId"], game_id);
    assert_eq!(v["raterId"], i64::from(rater_id));
    assert_eq!(v["content"], "Still holds up after thirty years.");
}

#[tokio::test]
async fn create_review_game_not_found() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;

    let (status, _) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": 999, "content": "Ghost game." }),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_review_empty_content() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (status, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "   " }),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn create_review_content_too_long() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (status, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "x".repeat(261) }),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert!(v["reason"].is_string());
}

#[tokio::test]
async fn create_review_unauthenticated() {
    let (app, _db) = test_app().await;

    let (status, _) = common::post_json(
        &app,
        "/reviews",
        &json!({ "gameId": 1, "content": "Anonymous opinion." }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn same_rater_may_review_a_game_twice() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    for content in ["First impressions.", "Second thoughts."] {
        let (status, body) = common::post_json_with_auth(
            &app,
            "/reviews",
            &json!({ "gameId": game_id, "content": content }),
            &token,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List / Retrieve Reviews
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_reviews_filtered_by_game() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let catan = create_game(&app, &token, "Catan").await;
    let azul = create_game(&app, &token, "Azul").await;

    for (game_id, content) in [(catan, "About Catan."), (azul, "About Azul.")] {
        let (status, _) = common::post_json_with_auth(
            &app,
            "/reviews",
            &json!({ "gameId": game_id, "content": content }),
            &token,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = common::get(&app, &format!("/reviews?game={catan}")).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let contents: Vec<&str> = v
        .as_array()
        .map(|rs| rs.iter().filter_map(|r| r["content"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(contents, vec!["About Catan."]);
}

#[tokio::test]
async fn get_review_not_found() {
    let (app, _db) = test_app().await;

    let (status, body) = common::get(&app, "/reviews/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert!(v["message"].is_string());
}

// ─────────────────────────────────────────────────────────────────────────────
// Update / Delete Review
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_review_success() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (_, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "Draft review." }),
        &token,
    )
    .await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let review_id = v["id"].as_i64().unwrap_or_default();

    let (status, body) = common::put_json_with_auth(
        &app,
        &format!("/reviews/{review_id}"),
        &json!({ "gameId": game_id, "content": "Final review." }),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT, "{body}");

    let (_, body) = common::get(&app, &format!("/reviews/{review_id}")).await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert_eq!(v["content"], "Final review.");
}

#[tokio::test]
async fn update_review_not_author() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (_, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "Mine." }),
        &token,
    )
    .await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let review_id = v["id"].as_i64().unwrap_or_default();

    let (_, stranger_token) = rater_with_token(&db, 2).await;

    let (status, _) = common::put_json_with_auth(
        &app,
        &format!("/reviews/{review_id}"),
        &json!({ "gameId": game_id, "content": "Hijacked." }),
        &stranger_token,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_review_success() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (_, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "Ephemeral." }),
        &token,
    )
    .await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let review_id = v["id"].as_i64().unwrap_or_default();

    let (status, _) = common::delete_with_auth(&app, &format!("/reviews/{review_id}"), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = common::get(&app, &format!("/reviews/{review_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_review_not_author() {
    let (app, db) = test_app().await;
    let (_, token) = rater_with_token(&db, 1).await;
    let game_id = create_game(&app, &token, "Catan").await;

    let (_, body) = common::post_json_with_auth(
        &app,
        "/reviews",
        &json!({ "gameId": game_id, "content": "Mine." }),
        &token,
    )
    .await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let review_id = v["id"].as_i64().unwrap_or_default();

    let (_, stranger_token) = rater_with_token(&db, 2).await;

    let (status, _) =
        common::delete_with_auth(&app, &format!("/reviews/{review_id}"), &stranger_token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
