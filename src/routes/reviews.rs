use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use crate::auth::middleware::AuthRater;
use crate::entities::{game, review};
use crate::error::{db_write_error, AppError};
use crate::state::AppState;

/// Review resource router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
}

// ============================================================================
// Request / Response Types
// ============================================================================

const CONTENT_MAX: usize = 260;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewPayload {
    game_id: i32,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ReviewListQuery {
    game: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewResponse {
    id: i32,
    created_at: String,
    updated_at: String,
    game_id: i32,
    rater_id: i32,
    content: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /reviews?game=<id>` — List reviews, optionally for one game.
async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut find = review::Entity::find();

    if let Some(game_id) = query.game {
        find = find.filter(review::Column::GameId.eq(game_id));
    }

    let reviews = find
        .order_by_asc(review::Column::Id)
        .all(&state.db)
        .await?;

    let body: Vec<ReviewResponse> = reviews.into_iter().map(to_review_response).collect();

    Ok(Json(body))
}

/// `POST /reviews` — Post a review of a game as the acting rater.
async fn create_review(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    JsonBody(req): JsonBody<ReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_content(&req.content)?;

    let txn = state.db.begin().await?;

    ensure_game_exists(&txn, req.game_id).await?;

    let now = chrono::Utc::now();
    let created = review::ActiveModel {
        game_id: ActiveValue::Set(req.game_id),
        rater_id: ActiveValue::Set(rater.id),
        content: ActiveValue::Set(req.content),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(db_write_error)?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(to_review_response(created))))
}

/// `GET /reviews/:id` — Get a single review.
async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_review(&state.db, id).await?;

    Ok(Json(to_review_response(found)))
}

/// `PUT /reviews/:id` — Replace a review's fields. Only its author may.
async fn update_review(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
    JsonBody(req): JsonBody<ReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_content(&req.content)?;

    let found = find_review(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the author of this review.".to_string(),
        ));
    }

    let txn = state.db.begin().await?;

    if req.game_id != found.game_id {
        ensure_game_exists(&txn, req.game_id).await?;
    }

    let mut active: review::ActiveModel = found.into();
    active.game_id = ActiveValue::Set(req.game_id);
    active.content = ActiveValue::Set(req.content);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
    active.update(&txn).await.map_err(db_write_error)?;

    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /reviews/:id` — Delete a review. Only its author may.
async fn delete_review(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_review(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the author of this review.".to_string(),
        ));
    }

    found.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_review(db: &DatabaseConnection, id: i32) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
}

async fn ensure_game_exists<C: sea_orm::ConnectionTrait>(
    conn: &C,
    game_id: i32,
) -> Result<(), AppError> {
    game::Entity::find_by_id(game_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;
    Ok(())
}

fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > CONTENT_MAX {
        return Err(AppError::BadRequest(format!(
            "content must be at most {CONTENT_MAX} characters"
        )));
    }
    Ok(())
}

fn to_review_response(model: review::Model) -> ReviewResponse {
    ReviewResponse {
        id: model.id,
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
        game_id: model.game_id,
        rater_id: model.rater_id,
        content: model.content,
    }
}
