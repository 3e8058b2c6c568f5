use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::body::JsonBody;
use crate::models::{CreateAttendanceRequest, UpdateAttendanceRequest};
use crate::state::AppState;
use crate::utils::response::{created, no_content, ok};
use crate::utils::AppResult;

/// POST /user_events
pub async fn create_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<CreateAttendanceRequest>,
) -> AppResult<Response> {
    let attendance = state.attendances.create(&user.principal(), request).await?;
    Ok(created(attendance))
}

/// PATCH|PUT /user_events/:id
pub async fn update_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateAttendanceRequest>,
) -> AppResult<Response> {
    let attendance = state
        .attendances
        .update(&user.principal(), id, request)
        .await?;
    Ok(ok(attendance))
}

/// DELETE /user_events/:id
pub async fn delete_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    state.attendances.delete(&user.principal(), id).await?;
    Ok(no_content())
}
