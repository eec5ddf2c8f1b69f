//! Speech capture and synthesis adapters
//!
//! The underlying capabilities are environment-provided and possibly
//! absent, so both are modeled as injected traits resolved once at startup
//! rather than re-probed. Capture reports cumulative partial text per
//! session and delivers tagged events over a channel into the session
//! controller; synthesis is fire-and-forget with no completion signal.

use crate::error::CaptureError;
use tokio::sync::mpsc;

/// Event a capture session delivers into the session controller.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// Cumulative partial recognition text for the current session.
    Partial(String),
    /// The capture session ended; pending text may now be submitted.
    Finalized,
    /// The capability reported a runtime error.
    Error(CaptureError),
}

/// Speech-to-text capability.
///
/// `start` begins one capture session and delivers events on `events` until
/// `Finalized` or `Error`; `stop` ends the session early. Capture is never
/// run concurrently with itself.
pub trait SpeechCapture: Send + Sync {
    /// Whether capture exists in the hosting environment.
    fn is_supported(&self) -> bool;

    fn start(&self, events: mpsc::Sender<CaptureEvent>) -> Result<(), CaptureError>;

    fn stop(&self);
}

/// Text-to-speech capability. Always safe to invoke.
pub trait SpeechSynthesis: Send + Sync {
    fn speak(&self, text: &str);

    /// Cancel any utterance still playing or queued.
    fn cancel_all(&self);
}

/// Capture adapter for environments without a speech-to-text capability.
#[derive(Debug, Default)]
pub struct UnsupportedCapture;

impl SpeechCapture for UnsupportedCapture {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&self, _events: mpsc::Sender<CaptureEvent>) -> Result<(), CaptureError> {
        Err(CaptureError::Unavailable)
    }

    fn stop(&self) {}
}

/// Synthesis adapter for environments without a voice.
#[derive(Debug, Default)]
pub struct NullSynthesis;

impl SpeechSynthesis for NullSynthesis {
    fn speak(&self, _text: &str) {}

    fn cancel_all(&self) {}
}
