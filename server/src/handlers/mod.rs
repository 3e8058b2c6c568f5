use axum::response::Response;
use serde::Serialize;

use crate::utils::response::ok;

pub mod attendances;
pub mod auth;
pub mod body;
pub mod events;
pub mod groups;

pub use auth::CurrentUser;
pub use body::JsonBody;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    ok(HealthPayload {
        status: "ok",
        service: "meetup-api",
    })
}
