//! Interview session management
//!
//! An `InterviewSession` wires the turn-taking state machine to its
//! transcription, dialogue, and speech collaborators.

mod config;
mod session;
mod stats;

pub use config::InterviewConfig;
pub use session::{gate_capture_on_speech, AnswerOutcome, InterviewSession};
pub use stats::SessionStats;
