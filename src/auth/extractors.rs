use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{
    error::AppError,
    state::AppState,
    users::dto::ShowUser,
};

/// Resolves the bearer token to the user it was issued for.
pub struct CurrentUser(pub ShowUser);

fn credentials_error() -> AppError {
    AppError::InvalidCredentials("Could not validate credentials".into())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Expect "Bearer <token>"
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
            })
            .ok_or_else(|| AppError::InvalidCredentials("Not authenticated".into()))?;

        let claims = state.keys.validate(token)?;

        let user = state
            .store
            .get_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!("token subject has no user");
                credentials_error()
            })?;

        Ok(CurrentUser(user.into()))
    }
}
