//! Authentication extractor
//!
//! Resolves the bearer token in the Authorization header to a known user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use inbox_common::AppError;
use inbox_core::Snowflake;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Snowflake,
}

impl AuthUser {
    pub fn new(user_id: Snowflake) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        let ctx = app_state.service_context();

        let user_id = ctx.identity().identify(bearer.token()).map_err(|e| {
            tracing::warn!(error = %e, "Invalid access token");
            ApiError::App(e)
        })?;

        // A valid token for a user the directory does not know is still unauthenticated
        match ctx.user_repo().find_by_id(user_id).await? {
            Some(_) => Ok(AuthUser::new(user_id)),
            None => {
                tracing::warn!(user_id = %user_id, "Token subject is not a known user");
                Err(ApiError::App(AppError::InvalidToken))
            }
        }
    }
}
