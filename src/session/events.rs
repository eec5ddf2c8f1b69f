//! Capture event handling
//!
//! Pumps events from a capture session into the session controller and
//! applies the matching state transitions.

use super::{SessionController, SessionState, CAPTURE_UNSUPPORTED_MESSAGE, PERMISSION_DENIED_MESSAGE};
use crate::error::CaptureError;
use crate::speech::CaptureEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

impl SessionController {
    /// Spawn the pump task for one capture session. The task ends when the
    /// adapter drops its sender.
    pub(super) fn spawn_event_pump(&self, mut events: mpsc::Receiver<CaptureEvent>) {
        let controller = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                controller.handle_capture_event(event);
            }
        });
    }

    /// Apply a single capture event.
    ///
    /// Events from a session that is no longer listening (already finalized
    /// or cancelled) are ignored, so a late event cannot flip the state.
    pub(super) fn handle_capture_event(&self, event: CaptureEvent) {
        match event {
            CaptureEvent::Partial(text) => {
                let mut inner = self.lock();
                if inner.state == SessionState::Listening {
                    // The capability reports cumulative text per session, so
                    // the latest partial replaces rather than appends.
                    inner.pending_transcript = text;
                }
            }
            CaptureEvent::Finalized => {
                let pending = {
                    let mut inner = self.lock();
                    if inner.state != SessionState::Listening {
                        return;
                    }
                    inner.state = SessionState::Idle;
                    std::mem::take(&mut inner.pending_transcript)
                };
                if pending.trim().is_empty() {
                    debug!("Capture finalized with no recognized text");
                } else {
                    self.submit_query(&pending);
                }
            }
            CaptureEvent::Error(e) => {
                warn!("Capture error: {}", e);
                let mut inner = self.lock();
                inner.last_error = Some(capture_diagnostic(&e));
                if inner.state == SessionState::Listening {
                    inner.state = SessionState::Idle;
                    inner.pending_transcript.clear();
                }
            }
        }
    }
}

/// Map a capture error onto the user-facing diagnostic shown alongside the
/// transcript. Permission denial gets a distinguished message.
pub(super) fn capture_diagnostic(error: &CaptureError) -> String {
    match error {
        CaptureError::Unavailable => CAPTURE_UNSUPPORTED_MESSAGE.to_string(),
        CaptureError::PermissionDenied => PERMISSION_DENIED_MESSAGE.to_string(),
        CaptureError::Device(detail) => format!("Speech capture failed: {}", detail),
    }
}
