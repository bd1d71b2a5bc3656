//! Which actions an event's lifecycle stage allows.
//!
//! Upcoming moves to Ongoing or Active when the event window opens (driven
//! by an outside scheduler), then to Completed. Cancelled is reachable from
//! Upcoming and Ongoing. Completed and Cancelled are terminal.

use crate::domain::EventStatus;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Edit,
    CheckIn,
    ListAttendees,
    ChangeStatus(EventStatus),
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit => f.write_str("edit"),
            Self::CheckIn => f.write_str("check attendees in to"),
            Self::ListAttendees => f.write_str("list attendees of"),
            Self::ChangeStatus(to) => write!(f, "move to {}", to),
        }
    }
}

impl EventStatus {
    pub fn allows(&self, action: EventAction) -> bool {
        use EventStatus::*;
        match action {
            EventAction::Edit => matches!(self, Upcoming | Ongoing | Active),
            EventAction::CheckIn => matches!(self, Ongoing | Active),
            EventAction::ListAttendees => true,
            EventAction::ChangeStatus(to) => self.can_transition_to(to),
        }
    }

    pub fn can_transition_to(&self, to: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, to),
            (Upcoming, Ongoing)
                | (Upcoming, Active)
                | (Upcoming, Cancelled)
                | (Ongoing, Active)
                | (Active, Ongoing)
                | (Ongoing, Completed)
                | (Ongoing, Cancelled)
                | (Active, Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    /// Fail with `InvalidStateTransition` unless `action` is allowed.
    pub fn ensure(&self, action: EventAction) -> Result<()> {
        if self.allows(action) {
            Ok(())
        } else {
            tracing::warn!(status = %self, %action, "Rejected action for event status");
            Err(AppError::InvalidStateTransition { action, status: *self })
        }
    }
}
