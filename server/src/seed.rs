//! Demo data: two users, one group, one event both users attend.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tracing::info;

use crate::models::{
    CreateAttendanceRequest, CreateEventRequest, CreateGroupRequest, EventDetails, NewUser,
};
use crate::services::{AttendanceService, EventService, GroupService, Principal};
use crate::store::Store;
use crate::utils::AppResult;

/// Seeds the store through the services so every validation applies.
/// Returns `None` without touching anything when groups already exist.
pub async fn run(store: Arc<dyn Store>) -> AppResult<Option<EventDetails>> {
    if !store.list_groups().await?.is_empty() {
        info!("Store already has data, skipping seed");
        return Ok(None);
    }

    let dakota = store
        .insert_user(NewUser::new("Dakota", "dakota@dakota.com").with_bio("i love ruby"))
        .await?;
    let dex = store
        .insert_user(NewUser::new("Dex", "dex@dex.com").with_bio("i love js"))
        .await?;

    let group = GroupService::new(store.clone())
        .create(CreateGroupRequest {
            name: Some("SENG-083021".to_string()),
            location: Some("everywhere!".to_string()),
        })
        .await?;

    let events = EventService::new(store.clone());
    let organizer = Principal::new(dakota.id);
    let event = events
        .create(
            &organizer,
            CreateEventRequest {
                group_id: Some(group.id),
                title: Some("Rails Fundamentals".to_string()),
                description: Some("migrations generators and fun!".to_string()),
                location: Some("everywhere!".to_string()),
                start_time: Utc.with_ymd_and_hms(2021, 11, 1, 11, 0, 0).single(),
                end_time: Utc.with_ymd_and_hms(2021, 11, 1, 13, 0, 0).single(),
            },
        )
        .await?;

    let attendances = AttendanceService::new(store.clone());
    for user in [&dakota, &dex] {
        attendances
            .create(
                &Principal::new(user.id),
                CreateAttendanceRequest {
                    event_id: Some(event.event.id),
                },
            )
            .await?;
    }

    info!(event_id = %event.event.id, "Seeded demo data");
    events.get(event.event.id).await.map(Some)
}
