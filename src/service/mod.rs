pub mod conflict_detector;
pub mod event_service;
pub mod attendee_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use event_service::EventService;
use attendee_service::AttendeeService;

pub use conflict_detector::{ConflictDetector, BUFFER_MINUTES};

pub struct ServiceContext {
    pub event_repo: Arc<dyn EventRepository>,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub identity_lookup: Arc<dyn IdentityLookup>,
    pub event_service: Arc<EventService>,
    pub attendee_service: Arc<AttendeeService>,
}

impl ServiceContext {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        attendee_repo: Arc<dyn AttendeeRepository>,
        identity_lookup: Arc<dyn IdentityLookup>,
    ) -> Self {
        let event_service = Arc::new(EventService::new(event_repo.clone()));
        let attendee_service = Arc::new(AttendeeService::new(event_repo.clone(), attendee_repo.clone()));

        Self {
            event_repo,
            attendee_repo,
            identity_lookup,
            event_service,
            attendee_service,
        }
    }

    /// Wire the SQLite-backed repositories over one pool.
    pub fn sqlite(db_pool: SqlitePool) -> Self {
        Self::new(
            Arc::new(SqliteEventRepository::new(db_pool.clone())),
            Arc::new(SqliteAttendeeRepository::new(db_pool.clone())),
            Arc::new(SqliteIdentityLookup::new(db_pool)),
        )
    }
}
