//! Interview turn-taking and the dialogue/feedback services behind it
//!
//! The state machine (`Orchestrator`) is separate from the network
//! collaborators (`DialogueService` implementations) so the conversation
//! rules can be tested without any remote service.

mod fallback;
mod orchestrator;
mod service;
mod turn;

pub use fallback::{FallbackDialogue, ResilientDialogue};
pub use orchestrator::{
    InterviewState, Orchestrator, RandomTermination, TerminationPolicy, TurnOutcome,
    COMPLETION_MESSAGE, FALLBACK_FOLLOW_UP, GREETING,
};
pub use service::{DialogueRequest, DialogueResponse, DialogueService, OpenAiConfig, OpenAiDialogue};
pub use turn::{AnswerFeedback, ConversationTurn, Exchange, FinalFeedback, Role};
