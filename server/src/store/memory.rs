use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AttendanceStore, EventStore, GroupStore, MembershipStore, StoreError, StoreResult, UserStore,
    ATTENDANCE_CONSTRAINT, ATTENDANCE_EVENT_FK, ATTENDANCE_USER_FK, EVENT_GROUP_FK,
    EVENT_ORGANIZER_FK, EVENT_SLOT_CONSTRAINT, MEMBERSHIP_CONSTRAINT, MEMBERSHIP_GROUP_FK,
    MEMBERSHIP_USER_FK,
};
use crate::models::{
    Attendance, Event, EventFilter, Group, NewEvent, NewGroup, NewUser, User, UserGroup,
};

/// Rows are kept in insertion order, which doubles as creation order.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    events: Vec<Event>,
    attendances: Vec<Attendance>,
    memberships: Vec<UserGroup>,
}

impl Tables {
    fn slot_taken(
        &self,
        title: &str,
        location: &str,
        start_time: DateTime<Utc>,
        except: Option<Uuid>,
    ) -> bool {
        self.events.iter().any(|e| {
            Some(e.id) != except
                && e.title == title
                && e.location == location
                && e.start_time == start_time
        })
    }

    fn attending(&self, user_id: Uuid, event_id: Uuid, except: Option<Uuid>) -> bool {
        self.attendances
            .iter()
            .any(|a| Some(a.id) != except && a.user_id == user_id && a.event_id == event_id)
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn group_exists(&self, id: Uuid) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    fn event_exists(&self, id: Uuid) -> bool {
        self.events.iter().any(|e| e.id == id)
    }
}

/// Foreign-key check, evaluated under the same write guard as the insert.
fn references(exists: bool, constraint: &str) -> StoreResult<()> {
    if exists {
        Ok(())
    } else {
        Err(StoreError::MissingReference(constraint.to_string()))
    }
}

/// In-process store for development and tests. Every write holds the table
/// lock across its uniqueness and reference checks and the insert.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            bio: user.bio,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: group.name,
            location: group.location,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.groups.push(group.clone());
        Ok(group)
    }

    async fn get_group(&self, id: Uuid) -> StoreResult<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        Ok(self.tables.read().await.groups.clone())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        if tables.slot_taken(&event.title, &event.location, event.start_time, None) {
            return Err(StoreError::UniqueViolation(EVENT_SLOT_CONSTRAINT.to_string()));
        }
        references(tables.group_exists(event.group_id), EVENT_GROUP_FK)?;
        references(tables.user_exists(event.organizer_id), EVENT_ORGANIZER_FK)?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            group_id: event.group_id,
            organizer_id: event.organizer_id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_time: event.start_time,
            end_time: event.end_time,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_event_by_slot(
        &self,
        title: &str,
        location: &str,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.title == title && e.location == location && e.start_time == start_time)
            .cloned())
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        if tables.slot_taken(&event.title, &event.location, event.start_time, Some(event.id)) {
            return Err(StoreError::UniqueViolation(EVENT_SLOT_CONSTRAINT.to_string()));
        }
        if tables.event_exists(event.id) {
            references(tables.group_exists(event.group_id), EVENT_GROUP_FK)?;
        }

        let Some(stored) = tables.events.iter_mut().find(|e| e.id == event.id) else {
            return Ok(None);
        };
        *stored = Event {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..event.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        if tables.events.len() == before {
            return Ok(false);
        }
        tables.attendances.retain(|a| a.event_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert_attendance(&self, user_id: Uuid, event_id: Uuid) -> StoreResult<Attendance> {
        let mut tables = self.tables.write().await;
        if tables.attending(user_id, event_id, None) {
            return Err(StoreError::UniqueViolation(ATTENDANCE_CONSTRAINT.to_string()));
        }
        references(tables.user_exists(user_id), ATTENDANCE_USER_FK)?;
        references(tables.event_exists(event_id), ATTENDANCE_EVENT_FK)?;

        let now = Utc::now();
        let attendance = Attendance {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            created_at: now,
            updated_at: now,
        };
        tables.attendances.push(attendance.clone());
        Ok(attendance)
    }

    async fn get_attendance(&self, id: Uuid) -> StoreResult<Option<Attendance>> {
        let tables = self.tables.read().await;
        Ok(tables.attendances.iter().find(|a| a.id == id).cloned())
    }

    async fn update_attendance(&self, id: Uuid, event_id: Uuid) -> StoreResult<Option<Attendance>> {
        let mut tables = self.tables.write().await;
        let Some(user_id) = tables.attendances.iter().find(|a| a.id == id).map(|a| a.user_id) else {
            return Ok(None);
        };
        if tables.attending(user_id, event_id, Some(id)) {
            return Err(StoreError::UniqueViolation(ATTENDANCE_CONSTRAINT.to_string()));
        }
        references(tables.event_exists(event_id), ATTENDANCE_EVENT_FK)?;

        let Some(stored) = tables.attendances.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        stored.event_id = event_id;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_attendance(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.attendances.len();
        tables.attendances.retain(|a| a.id != id);
        Ok(tables.attendances.len() != before)
    }

    async fn list_attendances_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Attendance>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendances
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_attendees_for_event(&self, event_id: Uuid) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendances
            .iter()
            .filter(|a| a.event_id == event_id)
            .filter_map(|a| tables.users.iter().find(|u| u.id == a.user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn insert_membership(&self, user_id: Uuid, group_id: Uuid) -> StoreResult<UserGroup> {
        let mut tables = self.tables.write().await;
        if tables
            .memberships
            .iter()
            .any(|m| m.user_id == user_id && m.group_id == group_id)
        {
            return Err(StoreError::UniqueViolation(MEMBERSHIP_CONSTRAINT.to_string()));
        }
        references(tables.user_exists(user_id), MEMBERSHIP_USER_FK)?;
        references(tables.group_exists(group_id), MEMBERSHIP_GROUP_FK)?;

        let membership = UserGroup {
            id: Uuid::new_v4(),
            user_id,
            group_id,
            created_at: Utc::now(),
        };
        tables.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn get_membership(&self, id: Uuid) -> StoreResult<Option<UserGroup>> {
        let tables = self.tables.read().await;
        Ok(tables.memberships.iter().find(|m| m.id == id).cloned())
    }

    async fn delete_membership(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.memberships.len();
        tables.memberships.retain(|m| m.id != id);
        Ok(tables.memberships.len() != before)
    }
}
