use serde::{Deserialize, Serialize};

/// Configuration for one interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Position being interviewed for (e.g. "Software Engineer")
    pub role: String,

    /// Technical domain of the interview (e.g. "Backend")
    pub domain: String,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            role: "Software Engineer".to_string(),
            domain: "General".to_string(),
        }
    }
}
