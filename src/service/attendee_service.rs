use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{Attendee, CheckIn, Event, EventAction, Identity},
    error::{AppError, Result},
    repository::{AttendeeRepository, EventRepository},
};

/// Per-event check-in registry. A user appears at most once per event;
/// checking the same person in again returns the original record.
pub struct AttendeeService {
    event_repo: Arc<dyn EventRepository>,
    attendee_repo: Arc<dyn AttendeeRepository>,
}

impl AttendeeService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        attendee_repo: Arc<dyn AttendeeRepository>,
    ) -> Self {
        Self { event_repo, attendee_repo }
    }

    async fn event(&self, event_id: Uuid) -> Result<Event> {
        self.event_repo.find_by_id(event_id).await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Fails unless the event exists and is currently accepting check-ins.
    pub async fn ensure_check_in_open(&self, event_id: Uuid) -> Result<Event> {
        let event = self.event(event_id).await?;
        event.status.ensure(EventAction::CheckIn)?;
        Ok(event)
    }

    pub async fn add(&self, event_id: Uuid, identity: Identity) -> Result<CheckIn> {
        self.ensure_check_in_open(event_id).await?;

        if let Some(existing) = self.attendee_repo.find(event_id, &identity.user_id).await? {
            tracing::info!(%event_id, user_id = %existing.user_id, "Attendee already checked in");
            return Ok(CheckIn::AlreadyPresent(existing));
        }

        let attendee = Attendee::from_identity(event_id, identity, Utc::now());
        let upserted = match self.attendee_repo.upsert(event_id, attendee.clone()).await {
            Ok(upserted) => upserted,
            // A storage that reports the uniqueness violation as an error
            // instead of a no-op lands here.
            Err(AppError::DuplicateAttendee(_)) => {
                let existing = self.attendee_repo.find(event_id, &attendee.user_id).await?
                    .ok_or_else(|| AppError::Database("Duplicate attendee vanished".to_string()))?;
                return Ok(CheckIn::AlreadyPresent(existing));
            }
            Err(e) => return Err(e),
        };

        if upserted.inserted {
            tracing::info!(%event_id, user_id = %upserted.attendee.user_id, "Attendee checked in");
            Ok(CheckIn::Added(upserted.attendee))
        } else {
            tracing::info!(%event_id, user_id = %upserted.attendee.user_id, "Concurrent check-in already recorded");
            Ok(CheckIn::AlreadyPresent(upserted.attendee))
        }
    }

    pub async fn list(&self, event_id: Uuid) -> Result<Vec<Attendee>> {
        let event = self.event(event_id).await?;
        event.status.ensure(EventAction::ListAttendees)?;
        self.attendee_repo.list_by_event(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventStatus, EventVisibility};
    use crate::repository::Upserted;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct OneEvent(Event);

    #[async_trait]
    impl EventRepository for OneEvent {
        async fn create(&self, event: Event) -> Result<Event> { Ok(event) }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
            Ok((id == self.0.id).then(|| self.0.clone()))
        }
        async fn list_by_date(&self, _date: NaiveDate) -> Result<Vec<Event>> { Ok(vec![self.0.clone()]) }
        async fn update(&self, _id: Uuid, event: Event) -> Result<Event> { Ok(event) }
        async fn set_status(&self, _id: Uuid, _status: EventStatus) -> Result<Event> { Ok(self.0.clone()) }
        async fn archive(&self, _id: Uuid) -> Result<Event> { Ok(self.0.clone()) }
    }

    /// Storage whose pre-check always misses and whose insert reports a
    /// uniqueness violation, as a second admin racing us would cause.
    #[derive(Default)]
    struct RacingStore {
        stored: Mutex<Vec<Attendee>>,
        lookups: Mutex<usize>,
    }

    #[async_trait]
    impl AttendeeRepository for RacingStore {
        async fn upsert(&self, _event_id: Uuid, attendee: Attendee) -> Result<Upserted> {
            self.stored.lock().unwrap().push(attendee);
            Err(AppError::DuplicateAttendee("UNIQUE constraint failed".to_string()))
        }
        async fn find(&self, _event_id: Uuid, _user_id: &str) -> Result<Option<Attendee>> {
            let mut lookups = self.lookups.lock().unwrap();
            *lookups += 1;
            if *lookups == 1 {
                Ok(None)
            } else {
                Ok(self.stored.lock().unwrap().first().cloned())
            }
        }
        async fn list_by_event(&self, _event_id: Uuid) -> Result<Vec<Attendee>> {
            Ok(self.stored.lock().unwrap().clone())
        }
    }

    fn event(status: EventStatus) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Livelihood Fair".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            start_time: "09:00".to_string(),
            end_time: "12:00".to_string(),
            location: "Barangay Hall".to_string(),
            status,
            visibility: EventVisibility::Beneficiaries,
            barangay: "Poblacion".to_string(),
            image_url: None,
            archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: "42".to_string(),
            name: "Maria Santos".to_string(),
            email: "maria@example.com".to_string(),
            barangay: "Poblacion".to_string(),
        }
    }

    #[tokio::test]
    async fn storage_uniqueness_violation_is_treated_as_duplicate() {
        let ev = event(EventStatus::Ongoing);
        let service = AttendeeService::new(Arc::new(OneEvent(ev.clone())), Arc::new(RacingStore::default()));

        let outcome = service.add(ev.id, identity()).await.unwrap();
        assert!(!outcome.is_new());
        assert_eq!(outcome.attendee().user_id, "42");
    }

    #[tokio::test]
    async fn check_in_refused_before_event_starts() {
        let ev = event(EventStatus::Upcoming);
        let service = AttendeeService::new(Arc::new(OneEvent(ev.clone())), Arc::new(RacingStore::default()));

        let err = service.add(ev.id, identity()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStateTransition { action: EventAction::CheckIn, status: EventStatus::Upcoming }
        ));
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let ev = event(EventStatus::Active);
        let service = AttendeeService::new(Arc::new(OneEvent(ev)), Arc::new(RacingStore::default()));

        let err = service.add(Uuid::new_v4(), identity()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
