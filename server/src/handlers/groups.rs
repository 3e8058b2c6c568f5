use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::body::JsonBody;
use crate::models::{CreateGroupRequest, CreateMembershipRequest};
use crate::state::AppState;
use crate::utils::response::{created, no_content, ok};
use crate::utils::AppResult;

/// GET /groups
pub async fn list_groups(State(state): State<AppState>) -> AppResult<Response> {
    Ok(ok(state.groups.list().await?))
}

/// GET /groups/:id
pub async fn get_group(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    Ok(ok(state.groups.get(id).await?))
}

/// POST /groups
pub async fn create_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    JsonBody(request): JsonBody<CreateGroupRequest>,
) -> AppResult<Response> {
    Ok(created(state.groups.create(request).await?))
}

/// POST /user_groups
pub async fn join_group(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<CreateMembershipRequest>,
) -> AppResult<Response> {
    let membership = state.groups.join(&user.principal(), request).await?;
    Ok(created(membership))
}

/// DELETE /user_groups/:id
pub async fn leave_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    state.groups.leave(&user.principal(), id).await?;
    Ok(no_content())
}
