//! Voxchat: a voice chat assistant engine.
//!
//! Two collaborating components: the [`session::SessionController`], which
//! owns the conversational transcript and the listening/processing state
//! machine over injected speech adapters, and the [`relay`] module, which
//! mediates between a prompt plus prior turns and the hosted completion API
//! under a fixed persona. The `voxchat` binary serves the relay over HTTP
//! (see [`http`]); the session controller is embedded by client front-ends
//! that supply real capture and synthesis adapters.

pub mod config;
pub mod error;
pub mod http;
pub mod relay;
pub mod session;
pub mod speech;
pub mod transcript;

pub use error::{CaptureError, RelayError};
pub use session::{SessionController, SessionState};
pub use transcript::{Role, Transcript, Turn};
