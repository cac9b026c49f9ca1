use crate::capture::Recording;
use crate::error::TranscribeError;
use reqwest::multipart;
use std::time::Duration;
use tracing::{debug, info};

use super::AttemptParams;

/// Speech-to-text transport seam
///
/// One call = one remote attempt. The retry/fallback policy lives in
/// `Transcriber`; tests substitute counting mocks here.
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        recording: &Recording,
        params: &AttemptParams,
    ) -> Result<String, TranscribeError>;
}

/// Configuration for the remote transcription endpoint
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            api_key: String::new(),
            model: "whisper-1".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for an OpenAI-compatible transcription endpoint
pub struct WhisperClient {
    client: reqwest::Client,
    config: WhisperConfig,
}

impl WhisperClient {
    pub fn new(config: WhisperConfig) -> Result<Self, TranscribeError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn filename_for(mime_type: &str) -> &'static str {
        match mime_type {
            "audio/wav" => "audio.wav",
            "audio/mpeg" => "audio.mp3",
            _ => "audio.webm",
        }
    }
}

#[async_trait::async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(
        &self,
        recording: &Recording,
        params: &AttemptParams,
    ) -> Result<String, TranscribeError> {
        debug!(
            "Sending {} bytes to transcription service ({})",
            recording.bytes.len(),
            params.label
        );

        let file_part = multipart::Part::bytes(recording.bytes.clone())
            .file_name(Self::filename_for(&recording.mime_type))
            .mime_str(&recording.mime_type)
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone())
            .text("response_format", "text");

        if let Some(language) = &params.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &params.prompt {
            form = form.text("prompt", prompt.clone());
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let transcript = response
            .text()
            .await
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        info!(
            "Transcription attempt '{}' returned {} raw characters",
            params.label,
            transcript.len()
        );

        Ok(transcript)
    }
}
