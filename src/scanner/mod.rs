//! Camera-driven QR check-in.
//!
//! A scan runs as a small state machine:
//!
//! ```text
//! Idle -> Requesting -> Scanning -> Resolved | TimedOut | Error
//!            \______________\______ cancel() ______> Idle
//! ```
//!
//! The camera stream is held by a guard for the whole session, so it is
//! stopped on every way out: a match, the tick budget running out, a
//! capture or decode failure, `cancel()`, or the scan future being dropped.

pub mod camera;
pub mod decoder;
pub mod session;


use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::ScannerConfig,
    domain::CheckIn,
    error::{AppError, Result},
    repository::IdentityLookup,
    service::attendee_service::AttendeeService,
};

pub use camera::{Camera, CameraError, CaptureError, FacingMode, Frame, VideoStream};
pub use decoder::{DecodeError, QrDecoder};
pub use session::{ScanOutcome, ScanSession, ScanStatus};

use camera::StreamGuard;

enum PollEnd {
    Decoded(String),
    TimedOut,
    Cancelled,
    Failed(String),
}

/// Clears the "session active" slot however `start` exits. A session that
/// is dropped mid-scan never publishes an end state, so a status still
/// showing a live scan is put back to `Idle`.
struct ActiveSlot<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
    status: &'a watch::Sender<ScanStatus>,
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.slot.lock() {
            active.take();
        }
        self.status.send_if_modified(|status| {
            if status.is_live() {
                tracing::debug!("Scan abandoned, resetting status");
                *status = ScanStatus::Idle;
                true
            } else {
                false
            }
        });
    }
}

pub struct QrCheckInScanner {
    camera: Arc<dyn Camera>,
    decoder: Arc<dyn QrDecoder>,
    identities: Arc<dyn IdentityLookup>,
    attendees: Arc<AttendeeService>,
    config: ScannerConfig,
    status: watch::Sender<ScanStatus>,
    active: Mutex<Option<CancellationToken>>,
}

impl QrCheckInScanner {
    pub fn new(
        camera: Arc<dyn Camera>,
        decoder: Arc<dyn QrDecoder>,
        identities: Arc<dyn IdentityLookup>,
        attendees: Arc<AttendeeService>,
        config: ScannerConfig,
    ) -> Self {
        let (status, _) = watch::channel(ScanStatus::Idle);
        Self {
            camera,
            decoder,
            identities,
            attendees,
            config,
            status,
            active: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> ScanStatus {
        self.status.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().map(|a| a.is_some()).unwrap_or(false)
    }

    /// Ask the live session, if any, to stop. Returns whether there was one.
    ///
    /// The session notices on its next poll, stops the camera, drops its
    /// timer and discards any decode still in flight. Once a code has been
    /// decoded the camera is already off and the check-in is recorded
    /// regardless, so this returns `false` from then on.
    pub fn cancel(&self) -> bool {
        let active = match self.active.lock() {
            Ok(active) => active,
            Err(poisoned) => poisoned.into_inner(),
        };
        match active.as_ref() {
            Some(token) if self.status.borrow().is_live() => {
                tracing::info!("Scan cancelled");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Run one scan session for `event_id` to completion.
    pub async fn start(&self, event_id: Uuid) -> Result<ScanOutcome> {
        let token = self.claim()?;
        let _slot = ActiveSlot { slot: &self.active, status: &self.status };
        self.status.send_replace(ScanStatus::Requesting);

        // Refuse before touching the camera if the event is not open for check-in.
        if let Err(e) = self.attendees.ensure_check_in_open(event_id).await {
            self.status.send_replace(ScanStatus::Error { message: e.to_string() });
            return Err(e);
        }

        tracing::info!(%event_id, "Requesting camera for check-in scan");

        let stream = tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.status.send_replace(ScanStatus::Idle);
                return Ok(ScanOutcome::Cancelled);
            }
            opened = self.acquire() => match opened {
                Ok(stream) => stream,
                Err(e) => {
                    self.status.send_replace(ScanStatus::Error { message: e.to_string() });
                    return Err(e);
                }
            },
        };

        let mut guard = StreamGuard::new(stream);
        self.status.send_replace(ScanStatus::Scanning { attempts: 0 });
        let end = self.poll(&mut guard, &token).await;
        guard.release();

        match end {
            PollEnd::Cancelled => {
                self.status.send_replace(ScanStatus::Idle);
                Ok(ScanOutcome::Cancelled)
            }
            PollEnd::TimedOut => {
                tracing::info!(%event_id, "Check-in scan timed out");
                self.status.send_replace(ScanStatus::TimedOut);
                Ok(ScanOutcome::TimedOut)
            }
            PollEnd::Failed(message) => {
                tracing::error!(%event_id, error = %message, "Check-in scan failed");
                self.status.send_replace(ScanStatus::Error { message: message.clone() });
                Err(AppError::Scanner(message))
            }
            PollEnd::Decoded(payload) => {
                self.status.send_replace(ScanStatus::Resolved { payload: payload.clone() });
                self.check_in(event_id, payload).await
            }
        }
    }

    fn claim(&self) -> Result<CancellationToken> {
        let mut active = self.active.lock()
            .map_err(|_| AppError::Internal("scanner state poisoned".to_string()))?;
        if active.is_some() {
            return Err(AppError::Conflict("A scan is already in progress".to_string()));
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        Ok(token)
    }

    async fn acquire(&self) -> Result<Box<dyn VideoStream>> {
        match self.camera.open(FacingMode::Environment).await {
            Ok(stream) => Ok(stream),
            Err(first) => {
                tracing::debug!(error = %first, "No rear camera, falling back to any camera");
                self.camera.open(FacingMode::Any).await.map_err(|e| {
                    tracing::warn!(error = %e, "No camera granted a stream");
                    AppError::CameraUnavailable(e.to_string())
                })
            }
        }
    }

    async fn poll(&self, guard: &mut StreamGuard, token: &CancellationToken) -> PollEnd {
        let mut session = ScanSession::new();
        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let min_spacing = self.config.min_attempt_spacing();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return PollEnd::Cancelled,
                _ = ticker.tick() => {}
            }

            if session.ticks >= self.config.max_ticks {
                tracing::debug!(
                    ticks = session.ticks,
                    attempts = session.attempts_made,
                    elapsed_ms = session.started_at.elapsed().as_millis() as u64,
                    "Scan budget exhausted"
                );
                return PollEnd::TimedOut;
            }
            session.ticks += 1;

            let now = Instant::now();
            if !session.attempt_due(now, min_spacing) {
                continue;
            }

            let frame = match guard.capture() {
                Ok(frame) => frame,
                Err(CaptureError::NotReady) => continue,
                Err(CaptureError::Failed(message)) => return PollEnd::Failed(message),
            };
            session.record_attempt(now);
            self.status.send_replace(ScanStatus::Scanning { attempts: session.attempts_made });

            let decoded = tokio::select! {
                biased;
                _ = token.cancelled() => return PollEnd::Cancelled,
                decoded = tokio::time::timeout(self.config.decode_timeout(), self.decoder.decode(&frame)) => decoded,
            };

            match decoded {
                Ok(Ok(payload)) => {
                    tracing::info!(attempts = session.attempts_made, "QR code decoded");
                    return PollEnd::Decoded(payload);
                }
                Ok(Err(DecodeError::NoCode)) => {
                    tracing::trace!(attempt = session.attempts_made, "No QR code in frame");
                }
                Ok(Err(DecodeError::Failed(message))) => return PollEnd::Failed(message),
                Err(_) => {
                    tracing::warn!(attempt = session.attempts_made, "Abandoned a decode that did not finish in time");
                }
            }
        }
    }

    async fn check_in(&self, event_id: Uuid, payload: String) -> Result<ScanOutcome> {
        let identity = match self.identities.by_token(&payload).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                tracing::info!(%event_id, token = %payload, "Unrecognized QR code");
                self.status.send_replace(ScanStatus::Idle);
                return Ok(ScanOutcome::UnknownCode(payload));
            }
            Err(e) => {
                self.status.send_replace(ScanStatus::Error { message: e.to_string() });
                return Err(e);
            }
        };

        match self.attendees.add(event_id, identity).await {
            Ok(CheckIn::Added(attendee)) => Ok(ScanOutcome::CheckedIn(attendee)),
            Ok(CheckIn::AlreadyPresent(attendee)) => Ok(ScanOutcome::AlreadyCheckedIn(attendee)),
            Err(e) => {
                self.status.send_replace(ScanStatus::Error { message: e.to_string() });
                Err(e)
            }
        }
    }
}
