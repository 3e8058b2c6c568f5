use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::event::Event;
use crate::utils::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub location: String,
}

/// Permitted fields for `POST /groups`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl CreateGroupRequest {
    pub fn validate(self) -> Result<NewGroup, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.require_text("name", self.name);
        let location = errors.require_text("location", self.location);

        match (name, location) {
            (Some(name), Some(location)) => Ok(NewGroup { name, location }),
            _ => Err(errors),
        }
    }
}

/// A group together with the events it hosts.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: Group,
    pub events: Vec<Event>,
}
