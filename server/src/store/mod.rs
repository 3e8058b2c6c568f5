//! Persistence for users, groups, events, attendances and memberships.
//!
//! Each entity has its own trait; [`Store`] bundles them so services can
//! share one `Arc<dyn Store>`. Uniqueness rules live here, not in the
//! services: both backends reject a conflicting write atomically and report
//! the violated constraint by name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Attendance, Event, EventFilter, Group, NewEvent, NewGroup, NewUser, User, UserGroup,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const EVENT_SLOT_CONSTRAINT: &str = "events_title_location_start_time_key";
pub const ATTENDANCE_CONSTRAINT: &str = "user_events_user_id_event_id_key";
pub const MEMBERSHIP_CONSTRAINT: &str = "user_groups_user_id_group_id_key";

pub const EVENT_GROUP_FK: &str = "events_group_id_fkey";
pub const EVENT_ORGANIZER_FK: &str = "events_organizer_id_fkey";
pub const ATTENDANCE_USER_FK: &str = "user_events_user_id_fkey";
pub const ATTENDANCE_EVENT_FK: &str = "user_events_event_id_fkey";
pub const MEMBERSHIP_USER_FK: &str = "user_groups_user_id_fkey";
pub const MEMBERSHIP_GROUP_FK: &str = "user_groups_group_id_fkey";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced row vanished between the caller's lookup and the write.
    #[error("Referenced row missing: {0}")]
    MissingReference(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The request field a constraint violation is reported against.
pub fn conflicting_field(constraint: &str) -> &'static str {
    match constraint {
        EVENT_SLOT_CONSTRAINT => "title",
        ATTENDANCE_CONSTRAINT => "event",
        MEMBERSHIP_CONSTRAINT => "group",
        _ => "base",
    }
}

/// The resource a foreign key points at.
pub fn referenced_resource(constraint: &str) -> &'static str {
    match constraint {
        EVENT_GROUP_FK | MEMBERSHIP_GROUP_FK => "Group",
        ATTENDANCE_EVENT_FK => "Event",
        EVENT_ORGANIZER_FK | ATTENDANCE_USER_FK | MEMBERSHIP_USER_FK => "User",
        _ => "Record",
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group>;
    async fn get_group(&self, id: Uuid) -> StoreResult<Option<Group>>;
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;
    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;
    async fn find_event_by_slot(
        &self,
        title: &str,
        location: &str,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Option<Event>>;
    /// Creation order.
    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>>;
    /// Writes every mutable column of `event`. `None` if the row is gone.
    async fn update_event(&self, event: &Event) -> StoreResult<Option<Event>>;
    /// Removes the event and all of its attendances in one atomic step.
    async fn delete_event(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn insert_attendance(&self, user_id: Uuid, event_id: Uuid) -> StoreResult<Attendance>;
    async fn get_attendance(&self, id: Uuid) -> StoreResult<Option<Attendance>>;
    async fn update_attendance(&self, id: Uuid, event_id: Uuid) -> StoreResult<Option<Attendance>>;
    async fn delete_attendance(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_attendances_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Attendance>>;
    /// Attending users in RSVP order.
    async fn list_attendees_for_event(&self, event_id: Uuid) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn insert_membership(&self, user_id: Uuid, group_id: Uuid) -> StoreResult<UserGroup>;
    async fn get_membership(&self, id: Uuid) -> StoreResult<Option<UserGroup>>;
    async fn delete_membership(&self, id: Uuid) -> StoreResult<bool>;
}

pub trait Store: UserStore + GroupStore + EventStore + AttendanceStore + MembershipStore {}

impl<T> Store for T where
    T: UserStore + GroupStore + EventStore + AttendanceStore + MembershipStore
{
}
