use crate::error::DialogueError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::turn::{AnswerFeedback, ConversationTurn, FinalFeedback, Role};

/// Request shape consumed by a dialogue/feedback service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueRequest {
    pub role: String,
    pub domain: String,
    pub transcript: String,
    pub conversation_history: Vec<ConversationTurn>,
    pub generate_follow_up: bool,
    pub is_introduction: bool,
}

/// Response shape produced by a dialogue/feedback service
///
/// Missing fields mean "service degraded"; callers substitute local
/// fallback content rather than failing the user flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueResponse {
    pub follow_up_question: Option<String>,
    pub feedback: Option<AnswerFeedback>,
}

/// Capability interface for the remote dialogue/feedback collaborator
///
/// Two implementations ship: a real remote client (`OpenAiDialogue`) and a
/// local deterministic one (`FallbackDialogue`), composed by
/// `ResilientDialogue` so the interview can always advance.
#[async_trait::async_trait]
pub trait DialogueService: Send + Sync {
    /// Evaluate the candidate's latest answer and produce the next
    /// interviewer utterance and/or per-answer feedback
    async fn next_turn(&self, request: &DialogueRequest) -> Result<DialogueResponse, DialogueError>;

    /// Produce the comprehensive end-of-session assessment
    async fn final_feedback(
        &self,
        role: &str,
        domain: &str,
        all_responses: &str,
        question_count: u32,
    ) -> Result<FinalFeedback, DialogueError>;
}

/// Configuration for the OpenAI-compatible chat endpoint
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

// ============================================================================
// Chat API types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

// ============================================================================
// Remote implementation
// ============================================================================

/// Dialogue service backed by an OpenAI-compatible chat completion endpoint
pub struct OpenAiDialogue {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiDialogue {
    pub fn new(config: OpenAiConfig) -> Result<Self, DialogueError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DialogueError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn chat(
        &self,
        system: &str,
        user: String,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, DialogueError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DialogueError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DialogueError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| DialogueError::Malformed(e.to_string()))?;

        let content = body
            .choices
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .map(|c| c.message.content)
            .ok_or_else(|| DialogueError::Malformed("no choices in response".to_string()))?;

        Ok(content)
    }

    fn render_history(history: &[ConversationTurn]) -> String {
        history
            .iter()
            .map(|turn| {
                let speaker = match turn.role {
                    Role::Interviewer => "Interviewer",
                    Role::Candidate => "Candidate",
                };
                format!("{}: {}", speaker, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Strip a markdown code fence if the model wrapped its JSON in one
    fn extract_json(content: &str) -> &str {
        let trimmed = content.trim();
        trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|s| s.strip_suffix("```"))
            .map(str::trim)
            .unwrap_or(trimmed)
    }
}

#[async_trait::async_trait]
impl DialogueService for OpenAiDialogue {
    async fn next_turn(&self, request: &DialogueRequest) -> Result<DialogueResponse, DialogueError> {
        let mut response = DialogueResponse::default();

        // Per-answer feedback
        let question = if request.is_introduction {
            "Tell me about yourself"
        } else {
            request
                .conversation_history
                .iter()
                .rev()
                .find(|t| t.role == Role::Interviewer)
                .map(|t| t.text.as_str())
                .unwrap_or("Interview question")
        };

        let feedback_prompt = format!(
            r#"You are a professional technical interviewer providing detailed feedback on a candidate's answer.

Question: "{question}"
Candidate's Answer: "{transcript}"

Provide comprehensive, constructive feedback in the exact JSON format below:

{{
  "score": 7.5,
  "communicationScore": 8.0,
  "technicalScore": 7.0,
  "strengths": ["..."],
  "weaknesses": ["..."],
  "suggestions": ["..."],
  "overallFeedback": "..."
}}

Provide feedback that:
- Evaluates technical knowledge and communication skills
- Gives 2-3 specific strengths and areas for improvement
- Provides actionable suggestions for development
- Maintains a professional, constructive tone"#,
            question = question,
            transcript = request.transcript,
        );

        match self
            .chat(
                "You are a senior technical interviewer who provides comprehensive, constructive \
                 feedback. Return feedback in the exact JSON format specified.",
                feedback_prompt,
                0.3,
                Some(800),
            )
            .await
        {
            Ok(content) => match serde_json::from_str(Self::extract_json(&content)) {
                Ok(feedback) => response.feedback = Some(feedback),
                Err(e) => {
                    warn!("Per-answer feedback was not valid JSON: {}", e);
                }
            },
            Err(e) => {
                warn!("Per-answer feedback call failed: {}", e);
            }
        }

        // Follow-up question
        if request.generate_follow_up {
            let follow_up_prompt = format!(
                r#"You are a professional technical interviewer conducting a {role} interview in {domain}. You are experienced, analytical, and thorough.

CONVERSATION HISTORY:
{history}

CANDIDATE'S RESPONSE: "{transcript}"

YOUR TASK:
Ask a technical, professional follow-up question that evaluates their expertise and experience.

GUIDELINES:
- Ask technical questions relevant to {role} in {domain}
- Probe deeper into their technical knowledge and experience
- Ask about specific technologies, methodologies, or challenges
- Evaluate problem-solving skills and technical depth
- Keep questions professional but not overly complex

Return only a professional, technical follow-up question."#,
                role = request.role,
                domain = request.domain,
                history = Self::render_history(&request.conversation_history),
                transcript = request.transcript,
            );

            let content = self
                .chat(
                    "You are a professional technical interviewer who asks insightful, technical \
                     follow-up questions. Evaluate candidates' expertise, problem-solving skills, \
                     and technical depth.",
                    follow_up_prompt,
                    0.7,
                    Some(200),
                )
                .await?;

            let question = content.trim().to_string();
            if question.is_empty() {
                return Err(DialogueError::Malformed(
                    "empty follow-up question".to_string(),
                ));
            }

            debug!("Generated follow-up question: {}", question);
            response.follow_up_question = Some(question);
        }

        Ok(response)
    }

    async fn final_feedback(
        &self,
        role: &str,
        domain: &str,
        all_responses: &str,
        question_count: u32,
    ) -> Result<FinalFeedback, DialogueError> {
        let prompt = format!(
            r#"Based on this complete interview conversation, provide comprehensive feedback:

ROLE: {role}
DOMAIN: {domain}
TOTAL QUESTIONS: {question_count}

CANDIDATE RESPONSES: "{all_responses}"

Please provide a detailed assessment in JSON format:
{{
  "overallScore": 7.5,
  "technicalAssessment": "Detailed technical knowledge evaluation",
  "communicationAssessment": "Communication skills assessment",
  "strengths": ["...", "...", "..."],
  "improvements": ["...", "...", "..."],
  "suggestions": ["...", "...", "..."],
  "nextSteps": "Specific recommendations for career development"
}}"#,
        );

        let content = self
            .chat(
                "You are a senior technical interviewer providing comprehensive feedback. Return \
                 only valid JSON format with the specified structure.",
                prompt,
                0.3,
                None,
            )
            .await?;

        serde_json::from_str(Self::extract_json(&content))
            .map_err(|e| DialogueError::Malformed(e.to_string()))
    }
}
