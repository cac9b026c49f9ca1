use super::config::InterviewConfig;
use super::stats::SessionStats;
use crate::capture::{Recording, RecordingSession};
use crate::dialogue::{
    AnswerFeedback, ConversationTurn, DialogueResponse, DialogueService, FallbackDialogue,
    FinalFeedback, Orchestrator, TerminationPolicy, TurnOutcome,
};
use crate::speech::{SpeakingStateRx, SpeechOutput};
use crate::transcribe::Transcriber;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Everything produced by one answered question
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// Cleaned transcript of the candidate's answer
    pub transcript: String,

    /// Next interviewer utterance (follow-up question or closing message)
    pub follow_up: String,

    /// Per-answer feedback, when the dialogue service produced any
    pub feedback: Option<AnswerFeedback>,

    /// True once the interview has concluded
    pub completed: bool,

    /// Comprehensive assessment, present only when `completed` is true
    pub final_feedback: Option<FinalFeedback>,
}

/// An interview session tying the conversation state machine to its
/// transcription, dialogue, and speech collaborators
///
/// The orchestrator lock is never held across a network call: a turn is
/// split into `begin_answer` (sync, under lock), the dialogue request
/// (async, lock released), and `complete_turn` (sync, under lock again).
pub struct InterviewSession {
    /// Session configuration
    config: InterviewConfig,

    /// Turn-taking state machine
    orchestrator: Mutex<Orchestrator>,

    /// Dialogue/feedback service (resilient wrapper in production)
    dialogue: Arc<dyn DialogueService>,

    /// Transcription pipeline for audio answers
    transcriber: Arc<Transcriber>,

    /// Spoken interviewer output
    speech: Arc<dyn SpeechOutput>,

    /// When the session started
    started_at: chrono::DateTime<chrono::Utc>,

    /// Cleared on close; in-flight turns abandon their results
    alive: Arc<AtomicBool>,
}

impl InterviewSession {
    pub fn new(
        config: InterviewConfig,
        dialogue: Arc<dyn DialogueService>,
        transcriber: Arc<Transcriber>,
        speech: Arc<dyn SpeechOutput>,
        termination: Box<dyn TerminationPolicy>,
    ) -> Self {
        info!("Creating interview session: {}", config.session_id);

        let orchestrator =
            Orchestrator::with_termination(config.role.clone(), config.domain.clone(), termination);

        Self {
            config,
            orchestrator: Mutex::new(orchestrator),
            dialogue,
            transcriber,
            speech,
            started_at: Utc::now(),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    /// Open the interview and speak the greeting; returns the greeting text
    pub async fn start(&self) -> Result<String> {
        let greeting = {
            let mut orchestrator = self.orchestrator.lock().await;
            orchestrator.open().context("Failed to open interview")?.text.clone()
        };

        if let Err(e) = self.speech.speak(&greeting).await {
            warn!("Greeting speech failed: {}", e);
        }

        Ok(greeting)
    }

    /// Submit a text answer and advance the interview by one turn
    pub async fn submit_text(&self, transcript: &str) -> Result<AnswerOutcome> {
        if !self.alive.load(Ordering::SeqCst) {
            bail!("Session is closed");
        }

        let request = {
            let mut orchestrator = self.orchestrator.lock().await;
            orchestrator
                .begin_answer(transcript)
                .context("Answer rejected")?
        };

        // Network call happens with the lock released; a concurrent submit
        // is rejected by the Processing state, not by lock contention
        let response = match self.dialogue.next_turn(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Dialogue service failed, advancing with defaults: {}", e);
                DialogueResponse::default()
            }
        };

        let outcome = {
            let mut orchestrator = self.orchestrator.lock().await;
            if !self.alive.load(Ordering::SeqCst) {
                bail!("Session closed while processing answer");
            }
            orchestrator
                .complete_turn(response)
                .context("Failed to complete turn")?
        };

        match outcome {
            TurnOutcome::FollowUp(question) => {
                if let Err(e) = self.speech.speak(&question).await {
                    warn!("Follow-up speech failed: {}", e);
                }

                let feedback = {
                    let orchestrator = self.orchestrator.lock().await;
                    orchestrator
                        .exchanges()
                        .last()
                        .and_then(|e| e.feedback.clone())
                };

                Ok(AnswerOutcome {
                    transcript: request.transcript,
                    follow_up: question,
                    feedback,
                    completed: false,
                    final_feedback: None,
                })
            }
            TurnOutcome::Concluding(closing) => {
                if let Err(e) = self.speech.speak(&closing).await {
                    warn!("Closing speech failed: {}", e);
                }

                let final_feedback = self.conclude().await?;

                let feedback = {
                    let orchestrator = self.orchestrator.lock().await;
                    orchestrator
                        .exchanges()
                        .last()
                        .and_then(|e| e.feedback.clone())
                };

                Ok(AnswerOutcome {
                    transcript: request.transcript,
                    follow_up: closing,
                    feedback,
                    completed: true,
                    final_feedback: Some(final_feedback),
                })
            }
        }
    }

    /// Submit a recorded audio answer: transcribe, then advance the turn
    pub async fn submit_audio(&self, recording: &Recording) -> Result<AnswerOutcome> {
        let transcript = self
            .transcriber
            .transcribe(recording)
            .await
            .context("Transcription failed")?;

        self.submit_text(&transcript).await
    }

    /// Request the comprehensive assessment and complete the interview
    async fn conclude(&self) -> Result<FinalFeedback> {
        let (role, domain, responses, count) = {
            let orchestrator = self.orchestrator.lock().await;
            (
                orchestrator.role().to_string(),
                orchestrator.domain().to_string(),
                orchestrator.all_responses(),
                orchestrator.question_count(),
            )
        };

        let feedback = match self
            .dialogue
            .final_feedback(&role, &domain, &responses, count)
            .await
        {
            Ok(feedback) => feedback,
            Err(e) => {
                error!("Final feedback service failed, using local summary: {}", e);
                FallbackDialogue::new()
                    .final_feedback(&role, &domain, &responses, count)
                    .await
                    .context("Local final feedback failed")?
            }
        };

        {
            let mut orchestrator = self.orchestrator.lock().await;
            orchestrator
                .finish(feedback.clone())
                .context("Failed to finish interview")?;
        }

        Ok(feedback)
    }

    /// Close the session; idempotent
    pub async fn close(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            info!("Closing interview session: {}", self.config.session_id);
            self.speech.stop().await;
        }
    }

    /// Get current session statistics
    pub async fn stats(&self) -> SessionStats {
        let orchestrator = self.orchestrator.lock().await;
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            state: orchestrator.state(),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            question_count: orchestrator.question_count(),
            turn_count: orchestrator.turns().len(),
        }
    }

    /// Snapshot of the ordered conversation log
    pub async fn transcript(&self) -> Vec<ConversationTurn> {
        let orchestrator = self.orchestrator.lock().await;
        orchestrator.turns().to_vec()
    }

    /// Comprehensive assessment, once the interview is complete
    pub async fn final_feedback(&self) -> Option<FinalFeedback> {
        let orchestrator = self.orchestrator.lock().await;
        orchestrator.final_feedback().cloned()
    }
}

/// Pause capture while the interviewer is speaking so the candidate's
/// recording never contains the synthesized question
pub fn gate_capture_on_speech(
    recording: Arc<RecordingSession>,
    mut speaking: SpeakingStateRx,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let is_speaking = *speaking.borrow_and_update();
            if is_speaking {
                recording.pause();
            } else {
                recording.resume();
            }
            if speaking.changed().await.is_err() {
                break;
            }
        }
    })
}
