use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{Attendee, Identity},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct ListResponse {
    attendees: Vec<Attendee>,
    total: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    attendee: Attendee,
    already_checked_in: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ListResponse>> {
    let attendees = state.service_context.attendee_service.list(event_id).await?;
    let total = attendees.len();
    Ok(Json(ListResponse { attendees, total }))
}

/// Manual search-and-add. A repeat for the same person answers 200 with the
/// original record instead of 201.
pub async fn add(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(identity): Json<Identity>,
) -> Result<(StatusCode, Json<CheckInResponse>)> {
    let check_in = state.service_context.attendee_service.add(event_id, identity).await?;

    let status = if check_in.is_new() { StatusCode::CREATED } else { StatusCode::OK };
    let already_checked_in = !check_in.is_new();
    Ok((status, Json(CheckInResponse {
        attendee: check_in.into_attendee(),
        already_checked_in,
    })))
}
