use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Stored as `HH:MM`; kept as text because rows written by other tools
    /// are not guaranteed to be well formed.
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub status: EventStatus,
    pub visibility: EventVisibility,
    pub barangay: String,
    pub image_url: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Active,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Upcoming" => Ok(Self::Upcoming),
            "Ongoing" => Ok(Self::Ongoing),
            "Active" => Ok(Self::Active),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid event status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventVisibility {
    Everyone,
    Beneficiaries,
    NonBeneficiaries,
}

impl EventVisibility {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Everyone => "Everyone",
            Self::Beneficiaries => "Beneficiaries",
            Self::NonBeneficiaries => "NonBeneficiaries",
        }
    }
}

impl std::str::FromStr for EventVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Everyone" => Ok(Self::Everyone),
            "Beneficiaries" => Ok(Self::Beneficiaries),
            "NonBeneficiaries" => Ok(Self::NonBeneficiaries),
            _ => Err(format!("invalid event visibility: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    pub visibility: EventVisibility,
    #[validate(length(min = 1, message = "barangay is required"))]
    pub barangay: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub visibility: Option<EventVisibility>,
    pub barangay: Option<String>,
    pub image_url: Option<String>,
}

/// The slice of an event the conflict check looks at.
///
/// Times are optional so a half-filled form can be checked and reported on
/// instead of failing to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCandidate {
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl ScheduleCandidate {
    pub fn new(date: NaiveDate, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            date,
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
        }
    }
}

impl From<&Event> for ScheduleCandidate {
    fn from(event: &Event) -> Self {
        Self::new(event.date, event.start_time.clone(), event.end_time.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicting_event: Option<Event>,
    pub reason: Option<String>,
}

impl ConflictReport {
    pub fn clear() -> Self {
        Self {
            has_conflict: false,
            conflicting_event: None,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            has_conflict: true,
            conflicting_event: None,
            reason: Some(reason.into()),
        }
    }

    pub fn conflict(event: Event, reason: String) -> Self {
        Self {
            has_conflict: true,
            conflicting_event: Some(event),
            reason: Some(reason),
        }
    }
}
