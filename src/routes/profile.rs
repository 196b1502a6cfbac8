use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use crate::auth::middleware::{AuthPrincipal, AuthRater};
use crate::entities::rater;
use crate::error::{db_write_error, AppError};
use crate::state::AppState;

/// Profile router: the acting rater's own profile.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_profile).post(create_profile).put(update_profile),
    )
}

// ============================================================================
// Request / Response Types
// ============================================================================

const BIO_MAX: usize = 150;

#[derive(Debug, Deserialize)]
struct ProfilePayload {
    bio: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RaterResponse {
    id: i32,
    user_id: i32,
    bio: String,
    created_at: String,
    updated_at: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /profile` — The acting rater's profile.
async fn get_profile(AuthRater(rater): AuthRater) -> Result<impl IntoResponse, AppError> {
    Ok(Json(to_rater_response(rater)))
}

/// `POST /profile` — Create the rater profile for the authenticated account.
async fn create_profile(
    State(state): State<AppState>,
    AuthPrincipal(user_id): AuthPrincipal,
    JsonBody(req): JsonBody<ProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_bio(&req.bio)?;

    let existing = rater::Entity::find()
        .filter(rater::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "A rater profile already exists for this account.".to_string(),
        ));
    }

    let now = chrono::Utc::now();
    let created = rater::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        bio: ActiveValue::Set(req.bio),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_write_error)?;

    Ok((StatusCode::CREATED, Json(to_rater_response(created))))
}

/// `PUT /profile` — Update the acting rater's bio.
async fn update_profile(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    JsonBody(req): JsonBody<ProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_bio(&req.bio)?;

    let mut active: rater::ActiveModel = rater.into();
    active.bio = ActiveValue::Set(req.bio);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
    active.update(&state.db).await.map_err(db_write_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_bio(bio: &str) -> Result<(), AppError> {
    if bio.chars().count() > BIO_MAX {
        return Err(AppError::BadRequest(format!(
            "bio must be at most {BIO_MAX} characters"
        )));
    }
    Ok(())
}

fn to_rater_response(model: rater::Model) -> RaterResponse {
    RaterResponse {
        id: model.id,
        user_id: model.user_id,
        bio: model.bio,
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
    }
}
