use axum::extract::{Path, Query, State};
use axum::response::Response;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::body::JsonBody;
use crate::models::{CreateEventRequest, EventFilter, UpdateEventRequest};
use crate::state::AppState;
use crate::utils::response::{created, no_content, ok};
use crate::utils::AppResult;

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> AppResult<Response> {
    let event = state.events.create(&user.principal(), request).await?;
    Ok(created(event))
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> AppResult<Response> {
    Ok(ok(state.events.list(&filter).await?))
}

/// GET /events/:id
pub async fn get_event(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    Ok(ok(state.events.get(id).await?))
}

/// GET /events/:id/attendees
pub async fn list_attendees(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    Ok(ok(state.events.attendees(id).await?))
}

/// PATCH|PUT /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> AppResult<Response> {
    let event = state.events.update(&user.principal(), id, request).await?;
    Ok(ok(event))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    state.events.delete(&user.principal(), id).await?;
    Ok(no_content())
}
