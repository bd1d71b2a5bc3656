use std::sync::Arc;
use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        time::{normalize, to_minutes}, ConflictReport, CreateEventRequest, Event, EventAction, EventStatus,
        ScheduleCandidate, UpdateEventRequest,
    },
    error::{AppError, Result},
    repository::EventRepository,
    service::conflict_detector::ConflictDetector,
};

/// Scheduling front door: every create and edit goes through the conflict
/// check before anything is written.
///
/// The check reads a snapshot of the day and takes no lock, so two admins
/// booking the same slot at the same moment can both succeed.
pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        self.repo.list_by_date(date).await
    }

    /// Run the conflict check against what is stored for the candidate's day.
    pub async fn check(&self, candidate: &ScheduleCandidate, exclude_id: Option<Uuid>) -> Result<ConflictReport> {
        let same_day = self.repo.list_by_date(candidate.date).await?;
        Ok(ConflictDetector::check(candidate, &same_day, exclude_id))
    }

    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        self.create_as_of(request, today()).await
    }

    pub async fn create_as_of(&self, mut request: CreateEventRequest, today: NaiveDate) -> Result<Event> {
        request.validate()?;
        validate_window(&request.start_time, &request.end_time)?;
        request.start_time = normalize(&request.start_time)?;
        request.end_time = normalize(&request.end_time)?;
        validate_future_date(request.date, today)?;

        let candidate = ScheduleCandidate::new(request.date, request.start_time.clone(), request.end_time.clone());
        self.refuse_on_conflict(&candidate, None).await?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            location: request.location,
            status: EventStatus::Upcoming,
            visibility: request.visibility,
            barangay: request.barangay,
            image_url: request.image_url,
            archived: false,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(event).await?;
        tracing::info!(event_id = %created.id, date = %created.date, "Event scheduled");
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        self.update_as_of(id, request, today()).await
    }

    pub async fn update_as_of(&self, id: Uuid, request: UpdateEventRequest, today: NaiveDate) -> Result<Event> {
        request.validate()?;
        let mut event = self.get(id).await?;
        event.status.ensure(EventAction::Edit)?;

        let reschedules = request.date.is_some() || request.start_time.is_some() || request.end_time.is_some();

        if let Some(title) = request.title { event.title = title; }
        if let Some(description) = request.description { event.description = description; }
        if let Some(date) = request.date { event.date = date; }
        if let Some(start_time) = request.start_time { event.start_time = start_time; }
        if let Some(end_time) = request.end_time { event.end_time = end_time; }
        if let Some(location) = request.location { event.location = location; }
        if let Some(visibility) = request.visibility { event.visibility = visibility; }
        if let Some(barangay) = request.barangay { event.barangay = barangay; }
        if let Some(image_url) = request.image_url { event.image_url = Some(image_url); }

        if reschedules {
            validate_window(&event.start_time, &event.end_time)?;
            event.start_time = normalize(&event.start_time)?;
            event.end_time = normalize(&event.end_time)?;
            validate_future_date(event.date, today)?;
            self.refuse_on_conflict(&ScheduleCandidate::from(&event), Some(id)).await?;
        }

        let updated = self.repo.update(id, event).await?;
        tracing::info!(event_id = %id, rescheduled = reschedules, "Event updated");
        Ok(updated)
    }

    pub async fn transition(&self, id: Uuid, to: EventStatus) -> Result<Event> {
        let event = self.get(id).await?;
        event.status.ensure(EventAction::ChangeStatus(to))?;

        let updated = self.repo.set_status(id, to).await?;
        tracing::info!(event_id = %id, from = %event.status, to = %to, "Event status changed");
        Ok(updated)
    }

    /// Events are never deleted. Archiving hides them from day listings and
    /// frees their slot.
    pub async fn archive(&self, id: Uuid) -> Result<Event> {
        let event = self.get(id).await?;
        if event.archived {
            return Ok(event);
        }
        let archived = self.repo.archive(id).await?;
        tracing::info!(event_id = %id, "Event archived");
        Ok(archived)
    }

    async fn refuse_on_conflict(&self, candidate: &ScheduleCandidate, exclude_id: Option<Uuid>) -> Result<()> {
        let report = self.check(candidate, exclude_id).await?;
        if report.has_conflict {
            tracing::warn!(
                date = %candidate.date,
                reason = report.reason.as_deref().unwrap_or_default(),
                "Refusing to schedule conflicting event"
            );
            return Err(AppError::ScheduleConflict(Box::new(report)));
        }
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn validate_window(start_time: &str, end_time: &str) -> Result<()> {
    let start = to_minutes(start_time)?;
    let end = to_minutes(end_time)?;
    if start >= end {
        return Err(AppError::Validation(format!(
            "Start time {} must be before end time {}",
            start_time, end_time
        )));
    }
    Ok(())
}

/// Tomorrow is the earliest day an event can be placed on, for new events
/// and for reschedules alike.
pub fn validate_future_date(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date <= today {
        return Err(AppError::Validation(format!(
            "Event date {} must be after {}",
            date.format("%Y-%m-%d"),
            today.format("%Y-%m-%d")
        )));
    }
    Ok(())
}
