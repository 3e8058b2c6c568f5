// End-to-end flow through the public router on the in-memory store.
// Run with: cargo test --test meetup_flow

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use meetup_server::models::NewUser;
use meetup_server::routes::create_routes;
use meetup_server::store::{MemoryStore, Store};
use meetup_server::{AppState, Config};

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: &str,
    body: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_rails_fundamentals_scenario() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let dakota = store
        .insert_user(NewUser::new("Dakota", "dakota@dakota.com").with_bio("i love ruby"))
        .await
        .unwrap()
        .id
        .to_string();
    let dex = store
        .insert_user(NewUser::new("Dex", "dex@dex.com").with_bio("i love js"))
        .await
        .unwrap()
        .id
        .to_string();

    let config = Config::default();
    let app = create_routes(AppState::new(store, &config), &config);

    let (status, group) = call(
        &app,
        Method::POST,
        "/groups",
        &dakota,
        json!({ "name": "SENG-083021", "location": "everywhere!" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let event_request = json!({
        "group_id": group["id"],
        "title": "Rails Fundamentals",
        "description": "migrations generators and fun!",
        "location": "everywhere!",
        "start_time": "2021-11-01T11:00:00Z",
        "end_time": "2021-11-01T13:00:00Z",
    });
    let (status, event) = call(&app, Method::POST, "/events", &dakota, event_request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().unwrap().to_string();

    for user in [&dakota, &dex] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/user_events",
            user,
            json!({ "event_id": event_id }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/events/{event_id}");
    let (status, shown) = call(&app, Method::GET, &uri, &dex, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    let attendees: Vec<&str> = shown["attendees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(attendees, vec!["Dakota", "Dex"]);

    let (status, errors) = call(&app, Method::POST, "/events", &dakota, event_request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(errors, json!({ "title": ["has already been taken"] }));

    let (status, listed) = call(
        &app,
        Method::GET,
        &format!("/events?group_id={}", group["id"].as_str().unwrap()),
        &dex,
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
