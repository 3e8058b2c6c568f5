use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::timestamp;
use super::user::User;
use crate::utils::validation::ValidationErrors;

/// A meetup event. `(title, location, start_time)` is unique across all events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub group_id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn assign(&mut self, group_id: Uuid, attributes: EventAttributes) {
        self.group_id = group_id;
        self.title = attributes.title;
        self.description = attributes.description;
        self.location = attributes.location;
        self.start_time = attributes.start_time;
        self.end_time = attributes.end_time;
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub organizer_id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NewEvent {
    pub fn new(organizer_id: Uuid, group_id: Uuid, attributes: EventAttributes) -> Self {
        Self {
            organizer_id,
            group_id,
            title: attributes.title,
            description: attributes.description,
            location: attributes.location,
            start_time: attributes.start_time,
            end_time: attributes.end_time,
        }
    }
}

/// Permitted event fields. Anything else in the request body (organizer,
/// ids, timestamps) is dropped during deserialization. Missing and `null`
/// both count as blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventParams {
    pub group_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub end_time: Option<DateTime<Utc>>,
}

pub type CreateEventRequest = EventParams;

impl EventParams {
    /// Records a blank error for each missing scalar. Returns the scalars
    /// only when all five are present.
    pub fn check_presence(&self, errors: &mut ValidationErrors) -> Option<EventAttributes> {
        let title = errors.require_text("title", self.title.clone());
        let description = errors.require_text("description", self.description.clone());
        let location = errors.require_text("location", self.location.clone());
        let start_time = errors.require("start_time", self.start_time);
        let end_time = errors.require("end_time", self.end_time);

        Some(EventAttributes {
            title: title?,
            description: description?,
            location: location?,
            start_time: start_time?,
            end_time: end_time?,
        })
    }
}

/// Partial update. An omitted field keeps its stored value; an explicit
/// `null` clears it and then fails the presence check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default, deserialize_with = "timestamp::present")]
    pub group_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "timestamp::present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamp::present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamp::present")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamp::nullable")]
    pub start_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "timestamp::nullable")]
    pub end_time: Option<Option<DateTime<Utc>>>,
}

impl UpdateEventRequest {
    /// The post-update state of `event` as full params.
    pub fn merged_onto(self, event: &Event) -> EventParams {
        EventParams {
            group_id: self.group_id.unwrap_or(Some(event.group_id)),
            title: self.title.unwrap_or_else(|| Some(event.title.clone())),
            description: self
                .description
                .unwrap_or_else(|| Some(event.description.clone())),
            location: self.location.unwrap_or_else(|| Some(event.location.clone())),
            start_time: self.start_time.unwrap_or(Some(event.start_time)),
            end_time: self.end_time.unwrap_or(Some(event.end_time)),
        }
    }
}

/// The five required scalars, known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct EventAttributes {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Optional filters for `GET /events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub group_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
}

impl EventFilter {
    pub fn for_group(group_id: Uuid) -> Self {
        Self {
            group_id: Some(group_id),
            organizer_id: None,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.group_id.map_or(true, |id| event.group_id == id)
            && self.organizer_id.map_or(true, |id| event.organizer_id == id)
    }
}

/// An event together with its attendees in RSVP order.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub attendees: Vec<User>,
}
