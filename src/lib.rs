pub mod audio;
pub mod capture;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod http;
pub mod session;
pub mod speech;
pub mod transcribe;

pub use audio::{
    sample_level, AnalyserSnapshot, Analyser, AudioFile, AudioFrame, AudioSource, CaptureBackend,
    CaptureBackendFactory, LevelMeter,
};
pub use capture::{Recording, RecordingConfig, RecordingSession};
pub use config::Config;
pub use dialogue::{
    DialogueService, FallbackDialogue, InterviewState, Orchestrator, ResilientDialogue,
};
pub use error::{CaptureError, DialogueError, TranscribeError, TurnError};
pub use http::{create_router, AppState};
pub use session::{AnswerOutcome, InterviewConfig, InterviewSession, SessionStats};
pub use speech::{NullSpeech, SpeechOutput, SystemSpeech};
pub use transcribe::{sniff_mime_type, Transcriber, WhisperClient, WhisperConfig};
