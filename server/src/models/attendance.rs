use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An RSVP: one user attending one event (`user_events`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permitted fields for `POST /user_events`. The attending user always comes
/// from the authenticated principal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAttendanceRequest {
    pub event_id: Option<Uuid>,
}

/// Permitted fields for `PATCH /user_events/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub event_id: Option<Uuid>,
}
