use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde::Serialize;
use serde_json::json;

use crate::{api::state::AppState, service::BUFFER_MINUTES};

#[derive(Serialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub status: String,
    pub schedule_buffer_minutes: i32,
    pub scan_budget_seconds: u64,
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn api_info(State(state): State<AppState>) -> impl IntoResponse {
    let scanner = &state.settings.scanner;
    Json(ApiInfo {
        name: "Barangay Events API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Event scheduling and attendee check-in for the solo parent welfare portal".to_string(),
        status: "operational".to_string(),
        schedule_buffer_minutes: BUFFER_MINUTES,
        scan_budget_seconds: (scanner.tick_interval() * scanner.max_ticks).as_secs(),
    })
}
