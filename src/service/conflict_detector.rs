use uuid::Uuid;

use crate::domain::{
    time::{minutes_to_time_of_day, to_minutes},
    ConflictReport, Event, ScheduleCandidate,
};

/// Minutes kept clear on each side of an existing event.
pub const BUFFER_MINUTES: i32 = 60;

/// Decides whether a candidate slot may be booked next to the events
/// already on the calendar.
///
/// Each existing event blocks `[start - 60, end + 60]`. A candidate
/// conflicts when its start lands in `[buffer_start, buffer_end)`, its end
/// lands in `(buffer_start, buffer_end]`, or it swallows the whole window.
/// Only the first conflicting event, in input order, is reported.
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn check(candidate: &ScheduleCandidate, existing: &[Event], exclude_id: Option<Uuid>) -> ConflictReport {
        let (Some(start), Some(end)) = (candidate.start_time.as_deref(), candidate.end_time.as_deref()) else {
            return ConflictReport::rejected("missing times");
        };
        let (Ok(new_start), Ok(new_end)) = (to_minutes(start), to_minutes(end)) else {
            return ConflictReport::rejected("missing times");
        };

        let same_day = existing
            .iter()
            .filter(|e| e.date == candidate.date)
            .filter(|e| Some(e.id) != exclude_id);

        for event in same_day {
            let (existing_start, existing_end) = match (to_minutes(&event.start_time), to_minutes(&event.end_time)) {
                (Ok(s), Ok(e)) => (s, e),
                _ => {
                    tracing::warn!(
                        event_id = %event.id,
                        start_time = %event.start_time,
                        end_time = %event.end_time,
                        "Skipping stored event with unreadable times"
                    );
                    continue;
                }
            };

            let buffer_start = existing_start - BUFFER_MINUTES;
            let buffer_end = existing_end + BUFFER_MINUTES;

            let start_inside = new_start >= buffer_start && new_start < buffer_end;
            let end_inside = new_end > buffer_start && new_end <= buffer_end;
            let swallows = new_start <= buffer_start && new_end >= buffer_end;

            if start_inside || end_inside || swallows {
                let reason = format!(
                    "\"{}\" runs {} to {}; no other event may be scheduled between {} and {} on {}",
                    event.title,
                    minutes_to_time_of_day(existing_start),
                    minutes_to_time_of_day(existing_end),
                    minutes_to_time_of_day(buffer_start),
                    minutes_to_time_of_day(buffer_end),
                    event.date.format("%Y-%m-%d"),
                );
                tracing::debug!(conflicting_event = %event.id, %reason, "Schedule conflict");
                return ConflictReport::conflict(event.clone(), reason);
            }
        }

        ConflictReport::clear()
    }
}
