use async_trait::async_trait;
use thiserror::Error;

use super::camera::Frame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Nothing readable in this frame. Expected on most frames.
    #[error("no QR code in frame")]
    NoCode,
    #[error("QR decoder failed: {0}")]
    Failed(String),
}

/// Black-box QR reader. Implementations that do heavy work should move it
/// off the async runtime (e.g. `spawn_blocking`); the scanner bounds each
/// call with a timeout either way.
#[async_trait]
pub trait QrDecoder: Send + Sync {
    async fn decode(&self, frame: &Frame) -> Result<String, DecodeError>;
}
