use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod event_repository;
pub mod attendee_repository;
pub mod identity_lookup;

pub use event_repository::SqliteEventRepository;
pub use attendee_repository::SqliteAttendeeRepository;
pub use identity_lookup::SqliteIdentityLookup;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: Event) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
    /// Non-archived events on `date`, in start order.
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Event>>;
    async fn update(&self, id: Uuid, event: Event) -> Result<Event>;
    async fn set_status(&self, id: Uuid, status: EventStatus) -> Result<Event>;
    async fn archive(&self, id: Uuid) -> Result<Event>;
}

/// Outcome of a storage-level upsert. `inserted == false` means a row for
/// the same `(event_id, user_id)` was already there and is returned as is.
#[derive(Debug, Clone)]
pub struct Upserted {
    pub attendee: Attendee,
    pub inserted: bool,
}

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    async fn upsert(&self, event_id: Uuid, attendee: Attendee) -> Result<Upserted>;
    async fn find(&self, event_id: Uuid, user_id: &str) -> Result<Option<Attendee>>;
    /// Ordered by check-in time, then by insertion order.
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Attendee>>;
}

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Resolve a decoded QR payload. `Ok(None)` means the token is unknown
    /// or belongs to someone who is not eligible.
    async fn by_token(&self, token: &str) -> Result<Option<Identity>>;
}
