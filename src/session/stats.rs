use crate::dialogue::InterviewState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statistics about an interview session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Current interview lifecycle state
    pub state: InterviewState,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of questions answered so far
    pub question_count: u32,

    /// Number of turns in the conversation log
    pub turn_count: usize,
}
