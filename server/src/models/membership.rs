use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Membership of a user in a group (`user_groups`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserGroup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMembershipRequest {
    pub group_id: Option<Uuid>,
}
