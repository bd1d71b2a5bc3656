use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub barangay: String,
    pub checked_in_at: DateTime<Utc>,
}

impl Attendee {
    pub fn from_identity(event_id: Uuid, identity: Identity, checked_in_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id: identity.user_id,
            name: identity.name,
            email: identity.email,
            barangay: identity.barangay,
            checked_in_at,
        }
    }
}

/// A verified person resolved from a QR token or picked from a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub barangay: String,
}

/// Result of a check-in. A repeat check-in is not an error, it hands back
/// the record that already exists.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckIn {
    Added(Attendee),
    AlreadyPresent(Attendee),
}

impl CheckIn {
    pub fn attendee(&self) -> &Attendee {
        match self {
            CheckIn::Added(a) | CheckIn::AlreadyPresent(a) => a,
        }
    }

    pub fn into_attendee(self) -> Attendee {
        match self {
            CheckIn::Added(a) | CheckIn::AlreadyPresent(a) => a,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, CheckIn::Added(_))
    }
}
