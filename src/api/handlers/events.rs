use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{ConflictReport, CreateEventRequest, Event, EventStatus, ScheduleCandidate, UpdateEventRequest},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    events: Vec<Event>,
    total: usize,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let events = state.service_context.event_service
        .list_by_date(params.date)
        .await?;

    let total = events.len();
    Ok(Json(ListResponse { events, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service.get(id).await?;
    Ok(Json(event))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.service_context.event_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service.update(id, request).await?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
pub struct ConflictCheckDto {
    #[serde(flatten)]
    candidate: ScheduleCandidate,
    exclude_id: Option<Uuid>,
}

/// Dry run of the scheduling check, for the admin form to call while the
/// user is still picking a slot.
pub async fn check_conflicts(
    State(state): State<AppState>,
    Json(dto): Json<ConflictCheckDto>,
) -> Result<Json<ConflictReport>> {
    let report = state.service_context.event_service
        .check(&dto.candidate, dto.exclude_id)
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeDto {
    status: EventStatus,
}

pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<StatusChangeDto>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service.transition(id, dto.status).await?;
    Ok(Json(event))
}

pub async fn archive(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service.archive(id).await?;
    Ok(Json(event))
}
