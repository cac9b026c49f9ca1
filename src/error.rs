use thiserror::Error;

/// Errors raised while acquiring devices or recording.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Permission denied or no matching media track on the backend.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The encoder failed mid-session; partial data has been discarded.
    #[error("recording failed: {0}")]
    Recording(String),
}

/// Errors raised by the transcription pipeline.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// Pre-flight validation failed; no network request was made.
    #[error("audio too short: {0}")]
    AudioTooShort(String),

    /// The recording exceeds the service upload limit.
    #[error("audio too large: {size} bytes (max {max})")]
    AudioTooLarge { size: usize, max: usize },

    /// Every attempt yielded empty or near-empty cleaned text.
    #[error("no speech detected in audio")]
    EmptyTranscription,

    /// Every attempt failed at the transport level.
    #[error("transcription service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The request never reached the service.
    #[error("transcription transport error: {0}")]
    Transport(String),
}

/// Errors raised by the remote dialogue/feedback service.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("dialogue service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The service responded but the content could not be parsed.
    #[error("unparseable dialogue response: {0}")]
    Malformed(String),

    #[error("dialogue transport error: {0}")]
    Transport(String),
}

/// Errors raised by the orchestrator state machine on invalid submissions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    /// Empty or whitespace-only answers are ignored without a remote call.
    #[error("answer is empty")]
    EmptyAnswer,

    /// Submission while not awaiting an answer (e.g. re-entrant submission
    /// while a turn is already being processed).
    #[error("not awaiting an answer (state: {state})")]
    NotAwaiting { state: &'static str },

    /// The interview has already concluded.
    #[error("interview is complete")]
    AlreadyComplete,
}
