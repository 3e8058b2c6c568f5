use std::sync::Arc;

use axum::http::HeaderName;

use crate::config::{Config, DEFAULT_AUTH_USER_HEADER};
use crate::services::{AttendanceService, EventService, GroupService};
use crate::store::Store;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub events: Arc<EventService>,
    pub attendances: Arc<AttendanceService>,
    pub groups: Arc<GroupService>,
    pub auth_header: HeaderName,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        let auth_header =
            HeaderName::try_from(config.auth_user_header.as_str()).unwrap_or_else(|e| {
                tracing::warn!(
                    header = %config.auth_user_header,
                    error = %e,
                    "Invalid auth header name, using {}",
                    DEFAULT_AUTH_USER_HEADER
                );
                HeaderName::from_static(DEFAULT_AUTH_USER_HEADER)
            });

        Self {
            events: Arc::new(EventService::new(store.clone())),
            attendances: Arc::new(AttendanceService::new(store.clone())),
            groups: Arc::new(GroupService::new(store.clone())),
            store,
            auth_header,
        }
    }
}
