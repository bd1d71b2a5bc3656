use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::Attendee;

/// What the host UI renders: camera preview, spinner, error text or toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    Idle,
    Requesting,
    Scanning { attempts: u32 },
    Resolved { payload: String },
    TimedOut,
    Error { message: String },
}

impl ScanStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, ScanStatus::Requesting | ScanStatus::Scanning { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    CheckedIn(Attendee),
    AlreadyCheckedIn(Attendee),
    /// Decoded fine, but the token does not belong to an eligible person.
    UnknownCode(String),
    TimedOut,
    Cancelled,
}

/// Bookkeeping for one polling run. Lives on the stack of the scan and is
/// gone once the scan returns.
#[derive(Debug)]
pub struct ScanSession {
    pub ticks: u32,
    pub attempts_made: u32,
    pub started_at: Instant,
    last_attempt: Option<Instant>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            attempts_made: 0,
            started_at: Instant::now(),
            last_attempt: None,
        }
    }

    /// True when at least `min_spacing` has passed since the last attempt.
    pub fn attempt_due(&self, now: Instant, min_spacing: Duration) -> bool {
        match self.last_attempt {
            Some(last) => now.saturating_duration_since(last) >= min_spacing,
            None => true,
        }
    }

    pub fn record_attempt(&mut self, now: Instant) {
        self.last_attempt = Some(now);
        self.attempts_made += 1;
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_is_always_due() {
        let session = ScanSession::new();
        assert!(session.attempt_due(Instant::now(), Duration::from_secs(60)));
    }

    #[test]
    fn attempts_are_spaced() {
        let mut session = ScanSession::new();
        let t0 = Instant::now();
        session.record_attempt(t0);
        let spacing = Duration::from_millis(150);
        assert!(!session.attempt_due(t0 + Duration::from_millis(149), spacing));
        assert!(session.attempt_due(t0 + Duration::from_millis(150), spacing));
        assert_eq!(session.attempts_made, 1);
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(ScanStatus::Scanning { attempts: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "scanning", "attempts": 3}));
        assert!(ScanStatus::Requesting.is_live());
        assert!(!ScanStatus::TimedOut.is_live());
    }
}
