use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{attendances, events, groups, health_check};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:id",
            get(events::get_event)
                .patch(events::update_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/attendees", get(events::list_attendees))
        .route("/user_events", post(attendances::create_attendance))
        .route(
            "/user_events/:id",
            patch(attendances::update_attendance)
                .put(attendances::update_attendance)
                .delete(attendances::delete_attendance),
        )
        .route("/user_groups", post(groups::join_group))
        .route("/user_groups/:id", delete(groups::leave_group))
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/:id", get(groups::get_group))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config))
        .layer(create_cors_layer(
            &config.cors_allowed_origins,
            &config.auth_user_header,
        ))
}
