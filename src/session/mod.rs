//! Conversation session controller
//!
//! Owns the transcript and the Idle → Listening → Processing state machine,
//! coordinating the capture and synthesis adapters with the completion
//! backend. State lives behind one lock and every transition is applied
//! atomically under it; capture events and completion results arrive as
//! messages, one at a time.
//!
//! # Architecture
//! A session consists of:
//! - The ordered transcript of finalized turns
//! - The pending (partial) recognition text for the current capture session
//! - At most one in-flight completion call, identified by a monotonically
//!   increasing sequence number; a newer call supersedes an older one, and
//!   a superseded reply is discarded on arrival

mod events;

use crate::error::CaptureError;
use crate::relay::CompletionBackend;
use crate::speech::{SpeechCapture, SpeechSynthesis};
use crate::transcript::{Transcript, Turn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Capacity of the capture event channel for one listening session.
const CAPTURE_EVENT_BUFFER: usize = 32;

/// Fixed diagnostic shown when the environment has no capture capability.
pub const CAPTURE_UNSUPPORTED_MESSAGE: &str =
    "Speech recognition is not supported in this environment.";

/// Fixed diagnostic shown when microphone permission is denied.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Microphone access was denied. Allow microphone access and try again.";

/// Content of the synthetic assistant turn appended when the relay fails.
pub const REPLY_ERROR_MESSAGE: &str =
    "Sorry, I ran into a problem answering that. Please try again.";

/// Session state. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Listening,
    Processing,
}

/// Mutable session data, guarded by the controller's lock.
struct Inner {
    state: SessionState,
    transcript: Transcript,
    pending_transcript: String,
    last_error: Option<String>,
    /// Sequence number of the most recently issued completion call. A reply
    /// is applied only while its sequence still matches.
    request_seq: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            transcript: Transcript::default(),
            pending_transcript: String::new(),
            last_error: None,
            request_seq: 0,
            in_flight: None,
        }
    }
}

/// Drives one conversational session over injected adapters.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Mutex<Inner>>,
    capture: Arc<dyn SpeechCapture>,
    synthesis: Arc<dyn SpeechSynthesis>,
    backend: Arc<dyn CompletionBackend>,
}

impl SessionController {
    pub fn new(
        capture: Arc<dyn SpeechCapture>,
        synthesis: Arc<dyn SpeechSynthesis>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            capture,
            synthesis,
            backend,
        }
    }

    /// Start a capture session (Idle → Listening).
    ///
    /// Clears any partial transcript and prior diagnostic, then asks the
    /// capture adapter to start. If capture is unsupported in this
    /// environment the controller stays Idle, records the fixed diagnostic,
    /// and returns the error. Starting while already listening is treated
    /// as a stop request.
    pub fn start_listening(&self) -> Result<(), CaptureError> {
        if self.state() == SessionState::Listening {
            self.stop_listening();
            return Ok(());
        }

        if !self.capture.is_supported() {
            let mut inner = self.lock();
            inner.last_error = Some(CAPTURE_UNSUPPORTED_MESSAGE.to_string());
            return Err(CaptureError::Unavailable);
        }

        {
            let mut inner = self.lock();
            inner.pending_transcript.clear();
            inner.last_error = None;
        }

        let (events_tx, events_rx) = mpsc::channel(CAPTURE_EVENT_BUFFER);
        if let Err(e) = self.capture.start(events_tx) {
            warn!("Failed to start speech capture: {}", e);
            let mut inner = self.lock();
            inner.last_error = Some(events::capture_diagnostic(&e));
            return Err(e);
        }

        self.lock().state = SessionState::Listening;
        self.spawn_event_pump(events_rx);
        info!("Listening started");
        Ok(())
    }

    /// Stop listening without submitting (user-cancel, Listening → Idle).
    pub fn stop_listening(&self) {
        self.capture.stop();
        let mut inner = self.lock();
        if inner.state == SessionState::Listening {
            inner.state = SessionState::Idle;
        }
        inner.pending_transcript.clear();
    }

    /// Submit a prompt to the completion backend (→ Processing).
    ///
    /// Whitespace-only text is a complete no-op. Otherwise the user turn is
    /// appended immediately and any in-flight call is superseded; the reply
    /// (or the error template) arrives later as an assistant turn.
    pub fn submit_query(&self, text: &str) {
        let prompt = text.trim().to_string();
        if prompt.is_empty() {
            return;
        }

        if self.state() == SessionState::Listening {
            // A typed submission while listening cancels capture first.
            self.stop_listening();
        }

        let (seq, history) = {
            let mut inner = self.lock();
            if let Some(handle) = inner.in_flight.take() {
                handle.abort();
            }
            inner.request_seq += 1;
            let seq = inner.request_seq;
            let history = inner.transcript.turns().to_vec();
            inner.transcript.push(Turn::user(prompt.clone()));
            inner.state = SessionState::Processing;
            (seq, history)
        };

        let controller = self.clone();
        let handle = tokio::spawn(async move {
            let result = controller.backend.get_reply(&prompt, &history).await;
            controller.apply_reply(seq, result);
        });
        self.lock().in_flight = Some(handle);
    }

    /// Cancel everything and return to a pristine idle session.
    pub fn reset(&self) {
        self.capture.stop();
        {
            let mut inner = self.lock();
            if let Some(handle) = inner.in_flight.take() {
                handle.abort();
            }
            // Invalidate any reply already resolving
            inner.request_seq += 1;
            inner.transcript.clear();
            inner.pending_transcript.clear();
            inner.last_error = None;
            inner.state = SessionState::Idle;
        }
        self.synthesis.cancel_all();
        info!("Session reset");
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Snapshot of the transcript in conversation order.
    pub fn transcript(&self) -> Vec<Turn> {
        self.lock().transcript.turns().to_vec()
    }

    /// Partial recognition text for the current capture session.
    pub fn pending_transcript(&self) -> String {
        self.lock().pending_transcript.clone()
    }

    /// Capture diagnostic shown alongside the transcript, if any.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Apply a completion result if its call has not been superseded.
    fn apply_reply(&self, seq: u64, result: Result<String, crate::error::RelayError>) {
        let reply = {
            let mut inner = self.lock();
            if seq != inner.request_seq {
                // Superseded; this result must not touch the transcript.
                return;
            }
            inner.in_flight = None;
            let content = match result {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Completion relay failed: {}", e);
                    REPLY_ERROR_MESSAGE.to_string()
                }
            };
            inner.transcript.push(Turn::assistant(content.clone()));
            // A capture session started while the call was in flight owns
            // the state now; only a Processing session returns to Idle.
            if inner.state == SessionState::Processing {
                inner.state = SessionState::Idle;
            }
            content
        };

        // Error replies are ordinary assistant turns; they are spoken too.
        self.synthesis.cancel_all();
        self.synthesis.speak(&reply);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => {
                warn!("Session mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
