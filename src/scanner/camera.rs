use async_trait::async_trait;
use thiserror::Error;

/// Which way the requested camera should face. Badge scanning prefers the
/// rear (environment) camera on phones and tablets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    Environment,
    Any,
}

/// One captured video frame as an 8-bit grayscale raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("no camera matches the request")]
    NoDevice,
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The stream is open but has no frame to hand out yet.
    #[error("video not ready")]
    NotReady,
    #[error("frame capture failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Acquire a live stream. May wait on a permission prompt; the caller
    /// drops the future to abandon the request.
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError>;
}

pub trait VideoStream: Send {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
    /// Release the device. Called exactly once per stream.
    fn stop(&mut self);
}

/// Owns an open stream for the length of a scan session and stops it when
/// released or dropped, whichever comes first.
pub(crate) struct StreamGuard {
    stream: Option<Box<dyn VideoStream>>,
}

impl StreamGuard {
    pub(crate) fn new(stream: Box<dyn VideoStream>) -> Self {
        Self { stream: Some(stream) }
    }

    pub(crate) fn capture(&mut self) -> Result<Frame, CaptureError> {
        match self.stream.as_mut() {
            Some(stream) => stream.capture(),
            None => Err(CaptureError::Failed("camera stream already released".to_string())),
        }
    }

    pub(crate) fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("Camera stream released");
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}
