use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::session::{Identity, Session},
    error::ApiError,
    state::AppState,
};

/// Resolves `Authorization: Bearer <token>` against the session store.
///
/// Handlers that take this extractor only run with a live identity;
/// anything else is rejected with 401 before the handler body. There is
/// no fallback user.
pub struct CurrentUser {
    pub token: Uuid,
    pub user: Identity,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        let token = Uuid::parse_str(token.trim()).map_err(|_| ApiError::Unauthenticated)?;

        match Session::resolve(&state.db, token).await? {
            Some(user) => Ok(CurrentUser { token, user }),
            None => {
                warn!("unknown or expired session token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
