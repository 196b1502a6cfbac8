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
use crate::entities::{game, rating};
use crate::error::{db_write_error, AppError};
use crate::state::AppState;

/// Rating resource router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ratings).post(create_rating))
        .route(
            "/{id}",
            get(get_rating).put(update_rating).delete(delete_rating),
        )
}

// ============================================================================
// Request / Response Types
// ============================================================================

const RATING_MIN: i32 = 1;
const RATING_MAX: i32 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingPayload {
    game_id: i32,
    rating: i32,
}

#[derive(Debug, Deserialize)]
struct RatingListQuery {
    game: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingResponse {
    id: i32,
    created_at: String,
    updated_at: String,
    game_id: i32,
    rater_id: i32,
    rating: i32,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /ratings?game=<id>` — List ratings, optionally for one game.
async fn list_ratings(
    State(state): State<AppState>,
    Query(query): Query<RatingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut find = rating::Entity::find();

    if let Some(game_id) = query.game {
        find = find.filter(rating::Column::GameId.eq(game_id));
    }

    let ratings = find
        .order_by_asc(rating::Column::Id)
        .all(&state.db)
        .await?;

    let body: Vec<RatingResponse> = ratings.into_iter().map(to_rating_response).collect();

    Ok(Json(body))
}

/// `POST /ratings` — Rate a game as the acting rater.
async fn create_rating(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    JsonBody(req): JsonBody<RatingPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_rating(req.rating)?;

    let txn = state.db.begin().await?;

    ensure_game_exists(&txn, req.game_id).await?;

    let now = chrono::Utc::now();
    let created = rating::ActiveModel {
        game_id: ActiveValue::Set(req.game_id),
        rater_id: ActiveValue::Set(rater.id),
        rating: ActiveValue::Set(req.rating),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(db_write_error)?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(to_rating_response(created))))
}

/// `GET /ratings/:id` — Get a single rating.
async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_rating(&state.db, id).await?;

    Ok(Json(to_rating_response(found)))
}

/// `PUT /ratings/:id` — Replace a rating's fields. Only its rater may.
async fn update_rating(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
    JsonBody(req): JsonBody<RatingPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_rating(req.rating)?;

    let found = find_rating(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the rater who posted this rating.".to_string(),
        ));
    }

    let txn = state.db.begin().await?;

    if req.game_id != found.game_id {
        ensure_game_exists(&txn, req.game_id).await?;
    }

    let mut active: rating::ActiveModel = found.into();
    active.game_id = ActiveValue::Set(req.game_id);
    active.rating = ActiveValue::Set(req.rating);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
    active.update(&txn).await.map_err(db_write_error)?;

    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /ratings/:id` — Delete a rating. Only its rater may.
async fn delete_rating(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_rating(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the rater who posted this rating.".to_string(),
        ));
    }

    found.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_rating(db: &DatabaseConnection, id: i32) -> Result<rating::Model, AppError> {
    rating::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))
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

fn validate_rating(value: i32) -> Result<(), AppError> {
    if !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(AppError::BadRequest(format!(
            "rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }
    Ok(())
}

fn to_rating_response(model: rating::Model) -> RatingResponse {
    RatingResponse {
        id: model.id,
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
        game_id: model.game_id,
        rater_id: model.rater_id,
        rating: model.rating,
    }
}
