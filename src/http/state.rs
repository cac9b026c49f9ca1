use crate::config::InterviewPolicyConfig;
use crate::dialogue::{DialogueService, RandomTermination, TerminationPolicy};
use crate::session::InterviewSession;
use crate::speech::SpeechOutput;
use crate::transcribe::Transcriber;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active interview sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<InterviewSession>>>>,

    /// Dialogue/feedback service shared by all sessions
    pub dialogue: Arc<dyn DialogueService>,

    /// Transcription pipeline shared by all sessions
    pub transcriber: Arc<Transcriber>,

    /// Spoken output shared by all sessions
    pub speech: Arc<dyn SpeechOutput>,

    /// Question-budget policy applied to new sessions
    pub policy: InterviewPolicyConfig,
}

impl AppState {
    pub fn new(
        dialogue: Arc<dyn DialogueService>,
        transcriber: Arc<Transcriber>,
        speech: Arc<dyn SpeechOutput>,
        policy: InterviewPolicyConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            dialogue,
            transcriber,
            speech,
            policy,
        }
    }

    /// Build the termination policy for a new session
    pub fn termination(&self) -> Box<dyn TerminationPolicy> {
        Box::new(RandomTermination::new(
            self.policy.min_questions,
            self.policy.max_questions,
            self.policy.end_probability,
        ))
    }
}
