use thiserror::Error;

/// Errors surfaced by the completion relay
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Completion API key is not configured")]
    Unconfigured,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from completion API: {0}")]
    InvalidResponse(String),

    #[error("Completion API error ({status}): {message}")]
    Upstream { status: u16, message: String },
}

/// Errors reported by the speech capture capability
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Speech capture is not supported in this environment")]
    Unavailable,

    #[error("Microphone permission was denied")]
    PermissionDenied,

    #[error("Speech capture error: {0}")]
    Device(String),
}
