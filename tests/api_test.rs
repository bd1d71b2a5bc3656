mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use barangay_events::{
    api::create_app,
    config::Settings,
    service::ServiceContext,
};
use chrono::{Duration, Local};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> anyhow::Result<Router> {
    let pool = common::memory_pool().await?;
    Ok(create_app(Arc::new(ServiceContext::sqlite(pool)), Arc::new(Settings::default())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}

fn event_body(date: &str, start: &str, end: &str) -> Value {
    json!({
        "title": format!("Assembly {start}"),
        "description": "General assembly",
        "date": date,
        "start_time": start,
        "end_time": end,
        "location": "Covered Court",
        "visibility": "Everyone",
        "barangay": "San Isidro",
        "image_url": null,
    })
}

fn next_week() -> String {
    (Local::now().date_naive() + Duration::days(7)).format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn health_and_info() -> anyhow::Result<()> {
    let app = app().await?;

    let (status, _) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, info) = send(&app, "GET", "/api", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["schedule_buffer_minutes"], 60);
    Ok(())
}

#[tokio::test]
async fn conflicting_event_is_answered_with_409() -> anyhow::Result<()> {
    let app = app().await?;
    let date = next_week();

    let (status, first) = send(&app, "POST", "/api/events", Some(event_body(&date, "09:00", "10:00"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "Upcoming");

    let (status, body) = send(&app, "POST", "/api/events", Some(event_body(&date, "10:30", "11:30"))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflicting_event"]["id"], first["id"]);
    assert!(body["reason"].as_str().unwrap().contains("08:00 and 11:00"));

    let (status, listing) = send(&app, "GET", &format!("/api/events?date={date}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    Ok(())
}

#[tokio::test]
async fn dry_run_reports_missing_times() -> anyhow::Result<()> {
    let app = app().await?;
    let date = next_week();

    let (status, report) = send(&app, "POST", "/api/events/conflicts", Some(json!({ "date": date, "start_time": "09:00" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["has_conflict"], true);
    assert_eq!(report["reason"], "missing times");
    Ok(())
}

#[tokio::test]
async fn manual_check_in_flow() -> anyhow::Result<()> {
    let app = app().await?;
    let (_, event) = send(&app, "POST", "/api/events", Some(event_body(&next_week(), "13:00", "15:00"))).await?;
    let id = event["id"].as_str().unwrap().to_string();
    let person = json!({
        "user_id": "42",
        "name": "Maria Santos",
        "email": "maria@example.com",
        "barangay": "San Isidro",
    });

    // Still upcoming, so check-in is closed.
    let (status, _) = send(&app, "POST", &format!("/api/events/{id}/attendees"), Some(person.clone())).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", &format!("/api/events/{id}/status"), Some(json!({ "status": "Ongoing" }))).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, first) = send(&app, "POST", &format!("/api/events/{id}/attendees"), Some(person.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["already_checked_in"], false);

    let (status, again) = send(&app, "POST", &format!("/api/events/{id}/attendees"), Some(person)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["already_checked_in"], true);
    assert_eq!(again["attendee"]["id"], first["attendee"]["id"]);

    let (_, listing) = send(&app, "GET", &format!("/api/events/{id}/attendees"), None).await?;
    assert_eq!(listing["total"], 1);
    Ok(())
}

#[tokio::test]
async fn unknown_event_is_404() -> anyhow::Result<()> {
    let app = app().await?;
    let (status, _) = send(&app, "GET", &format!("/api/events/{}", uuid::Uuid::new_v4()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
