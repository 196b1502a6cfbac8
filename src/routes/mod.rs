mod categories;
mod games;
mod health;
mod pictures;
mod profile;
mod ratings;
mod reviews;

use axum::extract::{FromRequest, Request};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health` — lightweight health check with database connectivity
/// - `/games`, `/categories`, `/reviews`, `/ratings`, `/pictures` — resources
/// - `/profile` — the authenticated rater's own profile
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/games", games::router())
        .nest("/categories", categories::router())
        .nest("/reviews", reviews::router())
        .nest("/ratings", ratings::router())
        .nest("/pictures", pictures::router())
        .nest("/profile", profile::router())
}

/// JSON body extractor whose rejection maps into the validation taxonomy.
///
/// Missing fields, wrong-typed fields and malformed JSON all answer
/// 400 `{ "reason": "..." }` instead of axum's default rejection status.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        Ok(Self(value))
    }
}
