use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use crate::auth::middleware::AuthRater;
use crate::entities::{category, game, game_category};
use crate::error::{db_write_error, AppError};
use crate::state::AppState;

/// Game resource router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_games).post(create_game))
        .route(
            "/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/{id}/category", post(add_category).delete(remove_category))
}

// ============================================================================
// Request / Response Types
// ============================================================================

const TITLE_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 100;
const YEAR_RELEASED_MIN: i32 = 1900;
const YEAR_RELEASED_MAX: i32 = 2100;
const AGE_RECOMMENDATION_MAX: i32 = 21;

/// Full field set required by both create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GamePayload {
    title: String,
    description: String,
    year_released: i32,
    number_of_players: i32,
    estimated_time: NaiveTime,
    age_recommendation: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryLinkPayload {
    category_id: i32,
}

#[derive(Debug, Deserialize)]
struct GameListQuery {
    category: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GameResponse {
    id: i32,
    created_at: String,
    updated_at: String,
    rater_id: i32,
    title: String,
    description: String,
    year_released: i32,
    number_of_players: i32,
    estimated_time: NaiveTime,
    age_recommendation: i32,
    categories: Vec<CategoryInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryInfo {
    id: i32,
    label: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /games?category=<id>` — List games, optionally only those linked to
/// a category.
async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<GameListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut find = game::Entity::find();

    if let Some(category_id) = query.category {
        let links = game_category::Entity::find()
            .filter(game_category::Column::CategoryId.eq(category_id))
            .all(&state.db)
            .await?;

        if links.is_empty() {
            return Ok(Json(Vec::<GameResponse>::new()));
        }

        let linked_ids: Vec<i32> = links.into_iter().map(|l| l.game_id).collect();
        find = find.filter(game::Column::Id.is_in(linked_ids));
    }

    let games = find
        .order_by_asc(game::Column::Id)
        .all(&state.db)
        .await?;

    let game_ids: Vec<i32> = games.iter().map(|g| g.id).collect();
    let mut category_sets = load_category_sets(&state.db, &game_ids).await?;

    let body: Vec<GameResponse> = games
        .into_iter()
        .map(|g| {
            let categories = category_sets.remove(&g.id).unwrap_or_default();
            to_game_response(g, categories)
        })
        .collect();

    Ok(Json(body))
}

/// `POST /games` — Add a new game for the acting rater.
async fn create_game(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    JsonBody(req): JsonBody<GamePayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_payload(&req)?;

    let now = chrono::Utc::now();
    let model = game::ActiveModel {
        rater_id: ActiveValue::Set(rater.id),
        title: ActiveValue::Set(req.title),
        description: ActiveValue::Set(req.description),
        year_released: ActiveValue::Set(req.year_released),
        number_of_players: ActiveValue::Set(req.number_of_players),
        estimated_time: ActiveValue::Set(req.estimated_time),
        age_recommendation: ActiveValue::Set(req.age_recommendation),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    };

    let created = model.insert(&state.db).await.map_err(db_write_error)?;

    Ok((
        StatusCode::CREATED,
        Json(to_game_response(created, Vec::new())),
    ))
}

/// `GET /games/:id` — Get a game with its category set.
async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_game(&state.db, id).await?;

    let mut category_sets = load_category_sets(&state.db, &[found.id]).await?;
    let categories = category_sets.remove(&found.id).unwrap_or_default();

    Ok(Json(to_game_response(found, categories)))
}

/// `PUT /games/:id` — Replace all fields of a game.
async fn update_game(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
    JsonBody(req): JsonBody<GamePayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_payload(&req)?;

    let found = find_game(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the rater who added this game.".to_string(),
        ));
    }

    let mut active: game::ActiveModel = found.into();
    active.title = ActiveValue::Set(req.title);
    active.description = ActiveValue::Set(req.description);
    active.year_released = ActiveValue::Set(req.year_released);
    active.number_of_players = ActiveValue::Set(req.number_of_players);
    active.estimated_time = ActiveValue::Set(req.estimated_time);
    active.age_recommendation = ActiveValue::Set(req.age_recommendation);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());

    active.update(&state.db).await.map_err(db_write_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /games/:id` — Delete a game. Reviews, ratings, pictures and
/// category links cascade at the store level.
async fn delete_game(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_game(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the rater who added this game.".to_string(),
        ));
    }

    found.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /games/:id/category` — Link a category to a game.
async fn add_category(
    State(state): State<AppState>,
    AuthRater(_rater): AuthRater,
    Path(id): Path<i32>,
    JsonBody(req): JsonBody<CategoryLinkPayload>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let found = game::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

    let cat = category::Entity::find_by_id(req.category_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let existing = game_category::Entity::find_by_id((found.id, cat.id))
        .one(&txn)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Category is already assigned to this game.".to_string(),
        ));
    }

    game_category::ActiveModel {
        game_id: ActiveValue::Set(found.id),
        category_id: ActiveValue::Set(cat.id),
    }
    .insert(&txn)
    .await
    .map_err(db_write_error)?;

    txn.commit().await?;

    Ok(StatusCode::CREATED)
}

/// `DELETE /games/:id/category` — Unlink a category from a game.
async fn remove_category(
    State(state): State<AppState>,
    AuthRater(_rater): AuthRater,
    Path(id): Path<i32>,
    JsonBody(req): JsonBody<CategoryLinkPayload>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let link = game_category::Entity::find_by_id((id, req.category_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Category is not assigned to this game.".to_string())
        })?;

    link.delete(&txn).await?;

    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_game(db: &DatabaseConnection, id: i32) -> Result<game::Model, AppError> {
    game::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".to_string()))
}

fn validate_payload(req: &GamePayload) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    if req.title.chars().count() > TITLE_MAX {
        return Err(AppError::BadRequest(format!(
            "title must be at most {TITLE_MAX} characters"
        )));
    }
    if req.description.chars().count() > DESCRIPTION_MAX {
        return Err(AppError::BadRequest(format!(
            "description must be at most {DESCRIPTION_MAX} characters"
        )));
    }
    if !(YEAR_RELEASED_MIN..=YEAR_RELEASED_MAX).contains(&req.year_released) {
        return Err(AppError::BadRequest(format!(
            "yearReleased must be between {YEAR_RELEASED_MIN} and {YEAR_RELEASED_MAX}"
        )));
    }
    if req.number_of_players < 1 {
        return Err(AppError::BadRequest(
            "numberOfPlayers must be at least 1".to_string(),
        ));
    }
    if !(0..=AGE_RECOMMENDATION_MAX).contains(&req.age_recommendation) {
        return Err(AppError::BadRequest(format!(
            "ageRecommendation must be between 0 and {AGE_RECOMMENDATION_MAX}"
        )));
    }
    Ok(())
}

/// Batch-load the category sets for a list of games: one query for the join
/// rows, one for the referenced categories, grouped by game id.
async fn load_category_sets(
    db: &DatabaseConnection,
    game_ids: &[i32],
) -> Result<HashMap<i32, Vec<CategoryInfo>>, AppError> {
    if game_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = game_category::Entity::find()
        .filter(game_category::Column::GameId.is_in(game_ids.iter().copied()))
        .all(db)
        .await?;

    if links.is_empty() {
        return Ok(HashMap::new());
    }

    let category_ids: Vec<i32> = links.iter().map(|l| l.category_id).collect();
    let categories = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?;

    let by_id: HashMap<i32, category::Model> =
        categories.into_iter().map(|c| (c.id, c)).collect();

    let mut sets: HashMap<i32, Vec<CategoryInfo>> = HashMap::new();
    for link in links {
        if let Some(cat) = by_id.get(&link.category_id) {
            sets.entry(link.game_id).or_default().push(CategoryInfo {
                id: cat.id,
                label: cat.label.clone(),
            });
        }
    }

    Ok(sets)
}

fn to_game_response(model: game::Model, categories: Vec<CategoryInfo>) -> GameResponse {
    GameResponse {
        id: model.id,
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
        rater_id: model.rater_id,
        title: model.title,
        description: model.description,
        year_released: model.year_released,
        number_of_players: model.number_of_players,
        estimated_time: model.estimated_time,
        age_recommendation: model.age_recommendation,
        categories,
    }
}
