use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::User;
use crate::services::Principal;
use crate::state::AppState;
use crate::utils::AppError;

/// The signed-in user. Authentication happens upstream; the session layer
/// forwards the user id in the configured header and this extractor only
/// resolves it to a stored user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn principal(&self) -> Principal {
        Principal::new(self.0.id)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(&state.auth_header)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| AppError::Unauthorized("Invalid user identity".to_string()))?;

        let user = state.store.get_user(user_id).await?.ok_or_else(|| {
            tracing::debug!(%user_id, "Forwarded user does not exist");
            AppError::Unauthorized("Invalid user identity".to_string())
        })?;

        Ok(CurrentUser(user))
    }
}
