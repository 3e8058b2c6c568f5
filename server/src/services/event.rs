use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::Principal;
use crate::models::{
    CreateEventRequest, Event, EventAttributes, EventDetails, EventFilter, EventParams, NewEvent,
    UpdateEventRequest, User,
};
use crate::store::Store;
use crate::utils::validation::{ValidationErrors, MUST_EXIST, TAKEN};
use crate::utils::{AppError, AppResult};

pub struct EventService {
    store: Arc<dyn Store>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        request: CreateEventRequest,
    ) -> AppResult<EventDetails> {
        let (group_id, attributes) = self.validate(&request, None).await?;

        let event = self
            .store
            .insert_event(NewEvent::new(principal.user_id, group_id, attributes))
            .await?;
        info!(event_id = %event.id, organizer_id = %principal.user_id, "Event created");

        Ok(EventDetails {
            event,
            attendees: Vec::new(),
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<EventDetails> {
        let event = self.find(id).await?;
        let attendees = self.store.list_attendees_for_event(id).await?;
        Ok(EventDetails { event, attendees })
    }

    pub async fn list(&self, filter: &EventFilter) -> AppResult<Vec<Event>> {
        Ok(self.store.list_events(filter).await?)
    }

    pub async fn attendees(&self, id: Uuid) -> AppResult<Vec<User>> {
        self.find(id).await?;
        Ok(self.store.list_attendees_for_event(id).await?)
    }

    /// Applies a partial change to one of the principal's own events and
    /// re-validates the resulting state.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        request: UpdateEventRequest,
    ) -> AppResult<EventDetails> {
        let mut event = self.find_organized(principal, id).await?;

        let merged = request.merged_onto(&event);
        let (group_id, attributes) = self.validate(&merged, Some(id)).await?;
        event.assign(group_id, attributes);

        let event = self
            .store
            .update_event(&event)
            .await?
            .ok_or_else(|| AppError::not_found("Event", id))?;
        info!(event_id = %id, "Event updated");

        let attendees = self.store.list_attendees_for_event(id).await?;
        Ok(EventDetails { event, attendees })
    }

    /// Deletes one of the principal's own events along with its attendances.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> AppResult<()> {
        self.find_organized(principal, id).await?;

        if !self.store.delete_event(id).await? {
            return Err(AppError::not_found("Event", id));
        }
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<Event> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::not_found("Event", id))
    }

    async fn find_organized(&self, principal: &Principal, id: Uuid) -> AppResult<Event> {
        match self.store.get_event(id).await? {
            Some(event) if event.organizer_id == principal.user_id => Ok(event),
            _ => Err(AppError::not_found("Event", id)),
        }
    }

    /// Runs every event validation and collects all failures. `current` is
    /// the event being updated, which may keep its own slot.
    async fn validate(
        &self,
        params: &EventParams,
        current: Option<Uuid>,
    ) -> AppResult<(Uuid, EventAttributes)> {
        let mut errors = ValidationErrors::new();

        let group = match params.group_id {
            Some(id) => self.store.get_group(id).await?,
            None => None,
        };
        let group_id = group.map(|g| g.id);
        if group_id.is_none() {
            errors.add("group", MUST_EXIST);
        }

        let attributes = params.check_presence(&mut errors);

        if let Some(attributes) = &attributes {
            let existing = self
                .store
                .find_event_by_slot(&attributes.title, &attributes.location, attributes.start_time)
                .await?;
            if existing.is_some_and(|e| Some(e.id) != current) {
                errors.add("title", TAKEN);
            }
        }

        match (group_id, attributes) {
            (Some(group_id), Some(attributes)) if errors.is_empty() => Ok((group_id, attributes)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewGroup, NewUser};
    use crate::store::MemoryStore;
    use crate::utils::validation::BLANK;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        store: Arc<dyn Store>,
        service: EventService,
        dakota: Principal,
        group_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let dakota = store
            .insert_user(NewUser::new("Dakota", "dakota@dakota.com").with_bio("i love ruby"))
            .await
            .unwrap();
        let group = store
            .insert_group(NewGroup {
                name: "SENG-083021".to_string(),
                location: "everywhere!".to_string(),
            })
            .await
            .unwrap();

        Fixture {
            service: EventService::new(store.clone()),
            store,
            dakota: Principal::new(dakota.id),
            group_id: group.id,
        }
    }

    fn rails_fundamentals(group_id: Uuid) -> CreateEventRequest {
        CreateEventRequest {
            group_id: Some(group_id),
            title: Some("Rails Fundamentals".to_string()),
            description: Some("migrations generators and fun!".to_string()),
            location: Some("everywhere!".to_string()),
            start_time: Some(Utc.with_ymd_and_hms(2021, 11, 1, 11, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2021, 11, 1, 13, 0, 0).unwrap()),
        }
    }

    fn expect_validation(result: AppResult<EventDetails>) -> ValidationErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_returns_input_fields() {
        let f = fixture().await;
        let request = rails_fundamentals(f.group_id);

        let created = f.service.create(&f.dakota, request.clone()).await.unwrap();

        assert_eq!(created.event.organizer_id, f.dakota.user_id);
        assert_eq!(created.event.group_id, f.group_id);
        assert_eq!(Some(created.event.title), request.title);
        assert_eq!(Some(created.event.description), request.description);
        assert_eq!(Some(created.event.location), request.location);
        assert_eq!(Some(created.event.start_time), request.start_time);
        assert_eq!(Some(created.event.end_time), request.end_time);
        assert!(created.attendees.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_missing_fields_persists_nothing() {
        let f = fixture().await;
        for field in ["title", "description", "location", "start_time", "end_time"] {
            let mut request = rails_fundamentals(f.group_id);
            match field {
                "title" => request.title = Some(String::new()),
                "description" => request.description = None,
                "location" => request.location = Some("  ".to_string()),
                "start_time" => request.start_time = None,
                _ => request.end_time = None,
            }

            let errors = expect_validation(f.service.create(&f.dakota, request).await);
            assert!(errors.contains(field, BLANK), "{field}: {errors}");
        }

        let events = f.service.list(&EventFilter::default()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_second_identical_create_is_duplicate() {
        let f = fixture().await;
        f.service
            .create(&f.dakota, rails_fundamentals(f.group_id))
            .await
            .unwrap();

        let errors =
            expect_validation(f.service.create(&f.dakota, rails_fundamentals(f.group_id)).await);
        assert!(errors.contains("title", TAKEN));
        assert_eq!(f.service.list(&EventFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_title_elsewhere_is_allowed() {
        let f = fixture().await;
        f.service
            .create(&f.dakota, rails_fundamentals(f.group_id))
            .await
            .unwrap();

        let mut request = rails_fundamentals(f.group_id);
        request.location = Some("Flatiron campus".to_string());
        f.service.create(&f.dakota, request).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_requires_existing_group() {
        let f = fixture().await;
        let mut request = rails_fundamentals(Uuid::new_v4());
        request.title = None;

        let errors = expect_validation(f.service.create(&f.dakota, request).await);
        assert!(errors.contains("group", MUST_EXIST));
        assert!(errors.contains("title", BLANK));
    }

    #[tokio::test]
    async fn test_update_revalidates_post_update_state() {
        let f = fixture().await;
        let first = f
            .service
            .create(&f.dakota, rails_fundamentals(f.group_id))
            .await
            .unwrap();
        let mut other = rails_fundamentals(f.group_id);
        other.title = Some("JS Fundamentals".to_string());
        let second = f.service.create(&f.dakota, other).await.unwrap();

        // Untouched slot: an update of the description alone must pass.
        let patch = UpdateEventRequest {
            description: Some(Some("now with scaffolds".to_string())),
            ..Default::default()
        };
        let updated = f
            .service
            .update(&f.dakota, first.event.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.event.description, "now with scaffolds");
        assert_eq!(updated.event.title, "Rails Fundamentals");

        let collide = UpdateEventRequest {
            title: Some(Some("Rails Fundamentals".to_string())),
            ..Default::default()
        };
        let errors = expect_validation(f.service.update(&f.dakota, second.event.id, collide).await);
        assert!(errors.contains("title", TAKEN));

        let blank = UpdateEventRequest {
            location: Some(Some(String::new())),
            ..Default::default()
        };
        let errors = expect_validation(f.service.update(&f.dakota, second.event.id, blank).await);
        assert!(errors.contains("location", BLANK));

        let cleared = UpdateEventRequest {
            title: Some(None),
            ..Default::default()
        };
        let errors =
            expect_validation(f.service.update(&f.dakota, second.event.id, cleared).await);
        assert!(errors.contains("title", BLANK));
    }

    #[tokio::test]
    async fn test_update_and_delete_are_scoped_to_organizer() {
        let f = fixture().await;
        let created = f
            .service
            .create(&f.dakota, rails_fundamentals(f.group_id))
            .await
            .unwrap();
        let dex = f
            .store
            .insert_user(NewUser::new("Dex", "dex@dex.com"))
            .await
            .unwrap();
        let dex = Principal::new(dex.id);

        let result = f
            .service
            .update(&dex, created.event.id, UpdateEventRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        let result = f.service.delete(&dex, created.event.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        f.service.delete(&f.dakota, created.event.id).await.unwrap();
        assert!(matches!(
            f.service.get(created.event.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let f = fixture().await;
        let id = Uuid::new_v4();

        assert!(matches!(f.service.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            f.service.update(&f.dakota, id, UpdateEventRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.delete(&f.dakota, id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_group_in_creation_order() {
        let f = fixture().await;
        let other_group = f
            .store
            .insert_group(NewGroup {
                name: "SENG-LIVE".to_string(),
                location: "online".to_string(),
            })
            .await
            .unwrap();

        let mut titles = Vec::new();
        for (i, group_id) in [f.group_id, other_group.id, f.group_id].into_iter().enumerate() {
            let mut request = rails_fundamentals(group_id);
            request.title = Some(format!("Session {i}"));
            f.service.create(&f.dakota, request).await.unwrap();
            titles.push(format!("Session {i}"));
        }

        let all: Vec<String> = f
            .service
            .list(&EventFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(all, titles);

        let in_group: Vec<String> = f
            .service
            .list(&EventFilter::for_group(f.group_id))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(in_group, vec!["Session 0", "Session 2"]);
    }
}
