use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::Principal;
use crate::models::{Attendance, CreateAttendanceRequest, UpdateAttendanceRequest};
use crate::store::Store;
use crate::utils::validation::{ValidationErrors, MUST_EXIST};
use crate::utils::{AppError, AppResult};

/// RSVPs. The attending user is always the principal.
pub struct AttendanceService {
    store: Arc<dyn Store>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        request: CreateAttendanceRequest,
    ) -> AppResult<Attendance> {
        let event_id = self.existing_event(request.event_id).await?;

        let attendance = self
            .store
            .insert_attendance(principal.user_id, event_id)
            .await?;
        info!(
            attendance_id = %attendance.id,
            user_id = %principal.user_id,
            event_id = %event_id,
            "Attendance created"
        );
        Ok(attendance)
    }

    /// Repoints one of the principal's attendances at another event.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        request: UpdateAttendanceRequest,
    ) -> AppResult<Attendance> {
        let attendance = self.find_own(principal, id).await?;
        let Some(event_id) = request.event_id else {
            // Nothing to change.
            return Ok(attendance);
        };
        let event_id = self.existing_event(Some(event_id)).await?;

        let attendance = self
            .store
            .update_attendance(id, event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Attendance", id))?;
        info!(attendance_id = %id, event_id = %event_id, "Attendance updated");
        Ok(attendance)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> AppResult<()> {
        self.find_own(principal, id).await?;

        if !self.store.delete_attendance(id).await? {
            return Err(AppError::not_found("Attendance", id));
        }
        info!(attendance_id = %id, "Attendance deleted");
        Ok(())
    }

    pub async fn list_for_event(&self, event_id: Uuid) -> AppResult<Vec<Attendance>> {
        Ok(self.store.list_attendances_for_event(event_id).await?)
    }

    /// A missing reference is a validation failure; a reference to an event
    /// that does not exist is `NotFound`.
    async fn existing_event(&self, event_id: Option<Uuid>) -> AppResult<Uuid> {
        let Some(event_id) = event_id else {
            return Err(ValidationErrors::single("event", MUST_EXIST).into());
        };
        match self.store.get_event(event_id).await? {
            Some(event) => Ok(event.id),
            None => Err(AppError::not_found("Event", event_id)),
        }
    }

    async fn find_own(&self, principal: &Principal, id: Uuid) -> AppResult<Attendance> {
        match self.store.get_attendance(id).await? {
            Some(attendance) if attendance.user_id == principal.user_id => Ok(attendance),
            _ => Err(AppError::not_found("Attendance", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEvent, NewGroup, NewUser};
    use crate::store::MemoryStore;
    use crate::utils::validation::TAKEN;
    use chrono::{Duration, Utc};

    struct Fixture {
        store: Arc<dyn Store>,
        service: AttendanceService,
        dakota: Principal,
        dex: Principal,
        event_id: Uuid,
    }

    async fn add_event(store: &Arc<dyn Store>, organizer_id: Uuid, title: &str) -> Uuid {
        let group = store
            .insert_group(NewGroup {
                name: "SENG-083021".to_string(),
                location: "everywhere!".to_string(),
            })
            .await
            .unwrap();
        let start_time = Utc::now();
        store
            .insert_event(NewEvent {
                organizer_id,
                group_id: group.id,
                title: title.to_string(),
                description: "migrations generators and fun!".to_string(),
                location: "everywhere!".to_string(),
                start_time,
                end_time: start_time + Duration::hours(2),
            })
            .await
            .unwrap()
            .id
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let dakota = store
            .insert_user(NewUser::new("Dakota", "dakota@dakota.com"))
            .await
            .unwrap();
        let dex = store
            .insert_user(NewUser::new("Dex", "dex@dex.com"))
            .await
            .unwrap();
        let event_id = add_event(&store, dakota.id, "Rails Fundamentals").await;

        Fixture {
            service: AttendanceService::new(store.clone()),
            store,
            dakota: Principal::new(dakota.id),
            dex: Principal::new(dex.id),
            event_id,
        }
    }

    fn rsvp(event_id: Uuid) -> CreateAttendanceRequest {
        CreateAttendanceRequest {
            event_id: Some(event_id),
        }
    }

    #[tokio::test]
    async fn test_create_links_principal_to_event() {
        let f = fixture().await;

        let attendance = f.service.create(&f.dex, rsvp(f.event_id)).await.unwrap();

        assert_eq!(attendance.user_id, f.dex.user_id);
        assert_eq!(attendance.event_id, f.event_id);
        assert_eq!(
            f.service.list_for_event(f.event_id).await.unwrap(),
            vec![attendance]
        );
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found_and_not_persisted() {
        let f = fixture().await;
        let missing = Uuid::new_v4();

        let result = f.service.create(&f.dex, rsvp(missing)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(f.service.list_for_event(missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_event_reference_is_invalid() {
        let f = fixture().await;

        let result = f
            .service
            .create(&f.dex, CreateAttendanceRequest::default())
            .await;

        match result {
            Err(AppError::Validation(errors)) => assert!(errors.contains("event", MUST_EXIST)),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_rsvp_is_rejected() {
        let f = fixture().await;
        f.service.create(&f.dex, rsvp(f.event_id)).await.unwrap();

        match f.service.create(&f.dex, rsvp(f.event_id)).await {
            Err(AppError::Validation(errors)) => assert!(errors.contains("event", TAKEN)),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(f.service.list_for_event(f.event_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_repoints_to_existing_event() {
        let f = fixture().await;
        let other_event = add_event(&f.store, f.dakota.user_id, "JS Fundamentals").await;
        let attendance = f.service.create(&f.dex, rsvp(f.event_id)).await.unwrap();

        let moved = f
            .service
            .update(
                &f.dex,
                attendance.id,
                UpdateAttendanceRequest {
                    event_id: Some(other_event),
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.event_id, other_event);
        assert!(f.service.list_for_event(f.event_id).await.unwrap().is_empty());

        let result = f
            .service
            .update(
                &f.dex,
                attendance.id,
                UpdateAttendanceRequest {
                    event_id: Some(Uuid::new_v4()),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_leaves_event_and_user_alone() {
        let f = fixture().await;
        let mine = f.service.create(&f.dex, rsvp(f.event_id)).await.unwrap();
        let theirs = f.service.create(&f.dakota, rsvp(f.event_id)).await.unwrap();

        // Someone else's RSVP cannot be removed.
        let result = f.service.delete(&f.dex, theirs.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        f.service.delete(&f.dex, mine.id).await.unwrap();

        assert_eq!(
            f.service.list_for_event(f.event_id).await.unwrap(),
            vec![theirs]
        );
        assert!(f.store.get_event(f.event_id).await.unwrap().is_some());
        assert!(f.store.get_user(f.dex.user_id).await.unwrap().is_some());
        assert!(matches!(
            f.service.delete(&f.dex, mine.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
