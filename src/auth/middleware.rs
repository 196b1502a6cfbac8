use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::auth::jwt;
use crate::entities::rater;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated principal extracted from the `Authorization: Bearer <token>`
/// header: the external user-account id the token was issued for.
///
/// Token issuing and sign-in live in the external authentication service;
/// this API only validates tokens and resolves the account they name.
#[derive(Debug, Clone, Copy)]
pub struct AuthPrincipal(pub i32);

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header.".to_string()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format.".to_string())
        })?;

        let claims = jwt::validate_access_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))?;

        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject.".to_string()))?;

        Ok(Self(user_id))
    }
}

/// The rater profile of the authenticated principal.
///
/// Use as an extractor in handler parameters to require a resolved rater:
/// ```ignore
/// async fn handler(AuthRater(rater): AuthRater) -> impl IntoResponse { ... }
/// ```
///
/// A valid token without a rater profile answers 401.
#[derive(Debug, Clone)]
pub struct AuthRater(pub rater::Model);

impl FromRequestParts<AppState> for AuthRater {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(user_id) = AuthPrincipal::from_request_parts(parts, state).await?;

        let rater_model = rater::Entity::find()
            .filter(rater::Column::UserId.eq(user_id))
            .one(&state.db)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or_else(|| {
                AppError::Unauthorized("No rater profile exists for this account.".to_string())
            })?;

        Ok(Self(rater_model))
    }
}
