use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{EntityTrait, QueryOrder};
use serde::Serialize;

use crate::entities::category;
use crate::error::AppError;
use crate::state::AppState;

/// Category catalog router. Categories are seed data; there is no create
/// operation.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}", get(get_category))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryResponse {
    id: i32,
    label: String,
}

/// `GET /categories` — List the category catalog.
async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(&state.db)
        .await?;

    let body: Vec<CategoryResponse> = categories.into_iter().map(to_category_response).collect();

    Ok(Json(body))
}

/// `GET /categories/:id` — Get a single category.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let cat = category::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(to_category_response(cat)))
}

fn to_category_response(model: category::Model) -> CategoryResponse {
    CategoryResponse {
        id: model.id,
        label: model.label,
    }
}
