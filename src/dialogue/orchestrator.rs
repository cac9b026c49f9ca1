use crate::error::TurnError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::service::{DialogueRequest, DialogueResponse};
use super::turn::{ConversationTurn, Exchange, FinalFeedback, Role};

/// Opening interviewer utterance
pub const GREETING: &str = "Good morning! Thank you for taking the time to speak with me today. \
     I'm excited to learn more about your background and experience in the field. Let's begin - \
     could you please tell me about yourself, your technical background, and what brings you to \
     this interview today?";

/// Closing interviewer utterance once the question budget is met
pub const COMPLETION_MESSAGE: &str = "Thank you for your responses. We've covered a good range \
     of topics. Let me provide you with comprehensive feedback on your interview performance.";

/// Question used when a response carries no usable follow-up
pub const FALLBACK_FOLLOW_UP: &str = "Can you walk me through the technical details of that \
     project? I'd like to understand your approach and the challenges you faced.";

/// Lifecycle of one interview conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewState {
    NotStarted,
    AwaitingAnswer,
    Processing,
    Concluding,
    Complete,
}

/// Decides when the interview has asked enough questions
pub trait TerminationPolicy: Send {
    fn should_conclude(&mut self, answered_questions: u32) -> bool;
}

/// Default policy: at least `min` questions, hard stop at `hard_cap`, and a
/// per-question chance of concluding in between
pub struct RandomTermination {
    min: u32,
    hard_cap: u32,
    probability: f64,
    rng: StdRng,
}

impl RandomTermination {
    pub fn new(min: u32, hard_cap: u32, probability: f64) -> Self {
        Self {
            min,
            hard_cap,
            probability,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant with a fixed RNG seed
    pub fn seeded(min: u32, hard_cap: u32, probability: f64, seed: u64) -> Self {
        Self {
            min,
            hard_cap,
            probability,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomTermination {
    fn default() -> Self {
        Self::new(10, 15, 0.3)
    }
}

impl TerminationPolicy for RandomTermination {
    fn should_conclude(&mut self, answered_questions: u32) -> bool {
        answered_questions >= self.min
            && (answered_questions >= self.hard_cap || self.rng.gen::<f64>() < self.probability)
    }
}

/// Result of applying one dialogue response to the conversation
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The interviewer asked another question; keep going
    FollowUp(String),
    /// The question budget is met; the closing message has been spoken and
    /// final feedback should now be requested
    Concluding(String),
}

/// Pure turn-taking state machine for one interview
///
/// Holds the ordered conversation log and drives the
/// greeting/answer/feedback/conclusion protocol. All I/O lives in the
/// caller; this type only validates transitions and appends turns, which
/// keeps the alternation and ordering rules directly testable.
pub struct Orchestrator {
    role: String,
    domain: String,
    turns: Vec<ConversationTurn>,
    exchanges: Vec<Exchange>,
    question_count: u32,
    state: InterviewState,
    termination: Box<dyn TerminationPolicy>,
    final_feedback: Option<FinalFeedback>,
}

impl Orchestrator {
    pub fn new(role: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::with_termination(role, domain, Box::new(RandomTermination::default()))
    }

    pub fn with_termination(
        role: impl Into<String>,
        domain: impl Into<String>,
        termination: Box<dyn TerminationPolicy>,
    ) -> Self {
        Self {
            role: role.into(),
            domain: domain.into(),
            turns: Vec::new(),
            exchanges: Vec::new(),
            question_count: 0,
            state: InterviewState::NotStarted,
            termination,
            final_feedback: None,
        }
    }

    pub fn state(&self) -> InterviewState {
        self.state
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn final_feedback(&self) -> Option<&FinalFeedback> {
        self.final_feedback.as_ref()
    }

    /// All candidate answers joined for the comprehensive assessment
    pub fn all_responses(&self) -> String {
        self.exchanges
            .iter()
            .map(|e| e.answer.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Start the interview: seed the conversation with the greeting
    pub fn open(&mut self) -> Result<&ConversationTurn, TurnError> {
        if self.state != InterviewState::NotStarted {
            return Err(TurnError::NotAwaiting {
                state: self.state_name(),
            });
        }

        self.turns.push(ConversationTurn::new(Role::Interviewer, GREETING));
        self.state = InterviewState::AwaitingAnswer;
        info!("Interview opened for {} ({})", self.role, self.domain);

        Ok(&self.turns[0])
    }

    /// Accept a candidate answer and produce the request for the dialogue
    /// service; transitions to `Processing` so concurrent submissions are
    /// rejected until `complete_turn` runs
    pub fn begin_answer(&mut self, transcript: &str) -> Result<DialogueRequest, TurnError> {
        match self.state {
            InterviewState::AwaitingAnswer => {}
            InterviewState::Complete => return Err(TurnError::AlreadyComplete),
            _ => {
                return Err(TurnError::NotAwaiting {
                    state: self.state_name(),
                })
            }
        }

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(TurnError::EmptyAnswer);
        }

        // Only the greeting precedes the candidate's first utterance
        let is_introduction = self.turns.len() == 1;

        self.turns
            .push(ConversationTurn::new(Role::Candidate, transcript));
        self.state = InterviewState::Processing;

        debug!(
            "Answer accepted (turn {}, introduction: {})",
            self.turns.len(),
            is_introduction
        );

        Ok(DialogueRequest {
            role: self.role.clone(),
            domain: self.domain.clone(),
            transcript: transcript.to_string(),
            conversation_history: self.turns.clone(),
            generate_follow_up: true,
            is_introduction,
        })
    }

    /// Apply the dialogue service's response to the pending answer
    pub fn complete_turn(&mut self, response: DialogueResponse) -> Result<TurnOutcome, TurnError> {
        if self.state != InterviewState::Processing {
            return Err(TurnError::NotAwaiting {
                state: self.state_name(),
            });
        }

        self.question_count += 1;

        let question = self
            .turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Interviewer)
            .map(|t| t.text.clone())
            .unwrap_or_default();
        let answer = self
            .turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Candidate)
            .map(|t| t.text.clone())
            .unwrap_or_default();

        self.exchanges.push(Exchange {
            question,
            answer,
            feedback: response.feedback,
        });

        if self.termination.should_conclude(self.question_count) {
            self.turns
                .push(ConversationTurn::new(Role::Interviewer, COMPLETION_MESSAGE));
            self.state = InterviewState::Concluding;
            info!(
                "Interview concluding after {} questions",
                self.question_count
            );
            return Ok(TurnOutcome::Concluding(COMPLETION_MESSAGE.to_string()));
        }

        let follow_up = response
            .follow_up_question
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_FOLLOW_UP.to_string());

        self.turns
            .push(ConversationTurn::new(Role::Interviewer, follow_up.clone()));
        self.state = InterviewState::AwaitingAnswer;

        Ok(TurnOutcome::FollowUp(follow_up))
    }

    /// Record the comprehensive assessment and complete the interview
    pub fn finish(&mut self, feedback: FinalFeedback) -> Result<(), TurnError> {
        if self.state != InterviewState::Concluding {
            return Err(TurnError::NotAwaiting {
                state: self.state_name(),
            });
        }

        self.final_feedback = Some(feedback);
        self.state = InterviewState::Complete;
        info!("Interview complete ({} questions)", self.question_count);

        Ok(())
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            InterviewState::NotStarted => "not_started",
            InterviewState::AwaitingAnswer => "awaiting_answer",
            InterviewState::Processing => "processing",
            InterviewState::Concluding => "concluding",
            InterviewState::Complete => "complete",
        }
    }
}
