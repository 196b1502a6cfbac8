use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AuthRater;
use crate::entities::{game, picture};
use crate::error::{db_write_error, AppError};
use crate::state::AppState;

/// Picture resource router. Rows hold storage keys; the image binaries live
/// on the filesystem under the configured upload root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pictures).post(create_picture))
        .route(
            "/{id}",
            get(get_picture).put(update_picture).delete(delete_picture),
        )
}

// ============================================================================
// Request / Response Types
// ============================================================================

const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024; // 5 MiB
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Debug, Deserialize)]
struct PictureListQuery {
    game: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PictureResponse {
    id: i32,
    created_at: String,
    game_id: i32,
    rater_id: i32,
    image_path: String,
}

/// An image part read out of a multipart body.
struct ImageUpload {
    content_type: String,
    data: Vec<u8>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /pictures?game=<id>` — List picture metadata, optionally for one game.
async fn list_pictures(
    State(state): State<AppState>,
    Query(query): Query<PictureListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut find = picture::Entity::find();

    if let Some(game_id) = query.game {
        find = find.filter(picture::Column::GameId.eq(game_id));
    }

    let pictures = find
        .order_by_asc(picture::Column::Id)
        .all(&state.db)
        .await?;

    let body: Vec<PictureResponse> = pictures.into_iter().map(to_picture_response).collect();

    Ok(Json(body))
}

/// `POST /pictures` — Upload a picture of a game as the acting rater.
///
/// Multipart form with a `gameId` text field and an `image` file field.
async fn create_picture(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut game_id: Option<i32> = None;
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("gameId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Could not read gameId: {e}")))?;
                game_id = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest("gameId must be an integer".to_string())
                })?);
            }
            Some("image") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Could not read image: {e}")))?;
                upload = Some(ImageUpload {
                    content_type,
                    data: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let game_id = game_id.ok_or_else(|| AppError::BadRequest("gameId is required".to_string()))?;
    let upload = upload.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;
    let ext = validate_image(&upload)?;

    let txn = state.db.begin().await?;

    let found = game::Entity::find_by_id(game_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

    let key = format!("pictures/{}/{}.{ext}", found.id, Uuid::new_v4());
    store_image(&state.config.upload_dir, &key, &upload.data).await?;

    let model = picture::ActiveModel {
        game_id: ActiveValue::Set(found.id),
        rater_id: ActiveValue::Set(rater.id),
        image_path: ActiveValue::Set(key.clone()),
        created_at: ActiveValue::Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    let created = match model.insert(&txn).await {
        Ok(p) => p,
        Err(err) => {
            remove_image(&state.config.upload_dir, &key).await;
            return Err(db_write_error(err));
        }
    };

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(to_picture_response(created))))
}

/// `GET /pictures/:id` — Get a single picture's metadata.
async fn get_picture(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_picture(&state.db, id).await?;

    Ok(Json(to_picture_response(found)))
}

/// `PUT /pictures/:id` — Replace the stored image. Only its uploader may.
///
/// Multipart form with an `image` file field.
async fn update_picture(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let found = find_picture(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the rater who uploaded this picture.".to_string(),
        ));
    }

    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Could not read image: {e}")))?;
            upload = Some(ImageUpload {
                content_type,
                data: bytes.to_vec(),
            });
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;
    let ext = validate_image(&upload)?;

    let key = format!("pictures/{}/{}.{ext}", found.game_id, Uuid::new_v4());
    store_image(&state.config.upload_dir, &key, &upload.data).await?;

    let old_key = found.image_path.clone();
    let mut active: picture::ActiveModel = found.into();
    active.image_path = ActiveValue::Set(key.clone());

    if let Err(err) = active.update(&state.db).await {
        remove_image(&state.config.upload_dir, &key).await;
        return Err(db_write_error(err));
    }

    remove_image(&state.config.upload_dir, &old_key).await;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /pictures/:id` — Delete a picture. Only its uploader may.
async fn delete_picture(
    State(state): State<AppState>,
    AuthRater(rater): AuthRater,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let found = find_picture(&state.db, id).await?;

    if found.rater_id != rater.id {
        return Err(AppError::Forbidden(
            "You are not the rater who uploaded this picture.".to_string(),
        ));
    }

    let key = found.image_path.clone();
    found.delete(&state.db).await?;
    remove_image(&state.config.upload_dir, &key).await;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_picture(db: &DatabaseConnection, id: i32) -> Result<picture::Model, AppError> {
    picture::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Picture not found".to_string()))
}

/// Check size and content type; returns the file extension for the stored key.
fn validate_image(upload: &ImageUpload) -> Result<&'static str, AppError> {
    if upload.data.is_empty() {
        return Err(AppError::BadRequest("No image provided".to_string()));
    }
    if upload.data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(
            "Image exceeds the 5 MiB size limit".to_string(),
        ));
    }
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == upload.content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type: {}", upload.content_type))
        })
}

async fn store_image(upload_dir: &str, key: &str, data: &[u8]) -> Result<(), AppError> {
    let path = std::path::Path::new(upload_dir).join(key);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
    }
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(())
}

/// Best-effort removal; failures are logged, not surfaced.
async fn remove_image(upload_dir: &str, key: &str) {
    let path = std::path::Path::new(upload_dir).join(key);
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!(%key, "Could not remove image file: {err}");
    }
}

fn to_picture_response(model: picture::Model) -> PictureResponse {
    PictureResponse {
        id: model.id,
        created_at: model.created_at.to_rfc3339(),
        game_id: model.game_id,
        rater_id: model.rater_id,
        image_path: model.image_path,
    }
}
