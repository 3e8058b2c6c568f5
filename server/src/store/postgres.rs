use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{
    AttendanceStore, EventStore, GroupStore, MembershipStore, StoreError, StoreResult, UserStore,
};
use crate::models::{
    Attendance, Event, EventFilter, Group, NewEvent, NewGroup, NewUser, User, UserGroup,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const USER_COLUMNS: &str = "id, username, email, bio, created_at, updated_at";
const GROUP_COLUMNS: &str = "id, name, location, created_at, updated_at";
const EVENT_COLUMNS: &str = "id, group_id, organizer_id, title, description, location, \
                             start_time, end_time, created_at, updated_at";
const ATTENDANCE_COLUMNS: &str = "id, user_id, event_id, created_at, updated_at";
const MEMBERSHIP_COLUMNS: &str = "id, user_id, group_id, created_at";

/// PostgreSQL-backed store. Uniqueness is guaranteed by the table constraints
/// in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!("Successfully connected to database");

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }
}

/// Unique and foreign-key violations become [`StoreError::UniqueViolation`]
/// and [`StoreError::MissingReference`] carrying the constraint name.
/// Everything else stays a database error.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(constraint) = db.constraint() {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return StoreError::UniqueViolation(constraint.to_string());
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return StoreError::MissingReference(constraint.to_string());
                }
                _ => {}
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, bio, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(user.email)
        .bind(user.bio)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "INSERT INTO groups (id, name, location, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {GROUP_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(group.name)
        .bind(group.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    async fn get_group(&self, id: Uuid) -> StoreResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                id, group_id, organizer_id, title, description, location,
                start_time, end_time, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(event.group_id)
        .bind(event.organizer_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_event_by_slot(
        &self,
        title: &str,
        location: &str,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE title = $1 AND location = $2 AND start_time = $3"
        ))
        .bind(title)
        .bind(location)
        .bind(start_time)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE ($1::uuid IS NULL OR group_id = $1)
              AND ($2::uuid IS NULL OR organizer_id = $2)
            ORDER BY created_at, id
            "#
        ))
        .bind(filter.group_id)
        .bind(filter.organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn update_event(&self, event: &Event) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET group_id = $2,
                title = $3,
                description = $4,
                location = $5,
                start_time = $6,
                end_time = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(event.group_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let attendances = sqlx::query("DELETE FROM user_events WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            event_id = %id,
            attendances = attendances.rows_affected(),
            "Deleted event"
        );
        Ok(deleted.rows_affected() > 0)
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn insert_attendance(&self, user_id: Uuid, event_id: Uuid) -> StoreResult<Attendance> {
        sqlx::query_as::<_, Attendance>(&format!(
            "INSERT INTO user_events (id, user_id, event_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_attendance(&self, id: Uuid) -> StoreResult<Option<Attendance>> {
        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM user_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendance)
    }

    async fn update_attendance(&self, id: Uuid, event_id: Uuid) -> StoreResult<Option<Attendance>> {
        sqlx::query_as::<_, Attendance>(&format!(
            "UPDATE user_events SET event_id = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_attendance(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM user_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_attendances_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Attendance>> {
        let attendances = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM user_events \
             WHERE event_id = $1 ORDER BY created_at, id"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendances)
    }

    async fn list_attendees_for_event(&self, event_id: Uuid) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.bio, u.created_at, u.updated_at
            FROM user_events ue
            JOIN users u ON u.id = ue.user_id
            WHERE ue.event_id = $1
            ORDER BY ue.created_at, ue.id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[async_trait]
impl MembershipStore for PgStore {
    async fn insert_membership(&self, user_id: Uuid, group_id: Uuid) -> StoreResult<UserGroup> {
        sqlx::query_as::<_, UserGroup>(&format!(
            "INSERT INTO user_groups (id, user_id, group_id, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING {MEMBERSHIP_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(group_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_membership(&self, id: Uuid) -> StoreResult<Option<UserGroup>> {
        let membership = sqlx::query_as::<_, UserGroup>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM user_groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn delete_membership(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM user_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
