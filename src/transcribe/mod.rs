//! Remote transcription with a bounded retry/fallback policy
//!
//! STT services sometimes return an empty transcript for valid audio; a
//! parameter change can recover it. `Transcriber` validates the recording
//! before any network call, then walks an ordered list of parameter sets
//! until one yields usable cleaned text.

mod clean;
mod client;

pub use clean::clean_transcript;
pub use client::{SpeechToText, WhisperClient, WhisperConfig};

use crate::capture::Recording;
use crate::error::TranscribeError;
use std::sync::Arc;
use tracing::{info, warn};

/// Minimum cleaned-transcript length accepted as real speech
const MIN_TRANSCRIPT_CHARS: usize = 2;

/// Parameters for one transcription attempt
#[derive(Debug, Clone)]
pub struct AttemptParams {
    pub label: String,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

impl AttemptParams {
    /// The default attempt sequence: language hint + contextual prompt,
    /// then auto-detect with a generic prompt, then minimal parameters.
    pub fn default_sequence() -> Vec<Self> {
        vec![
            Self {
                label: "english with interview prompt".to_string(),
                language: Some("en".to_string()),
                prompt: Some(
                    "This is an interview response in English. Please transcribe accurately."
                        .to_string(),
                ),
            },
            Self {
                label: "auto-detect language".to_string(),
                language: None,
                prompt: Some("Please transcribe this audio accurately.".to_string()),
            },
            Self {
                label: "minimal parameters".to_string(),
                language: None,
                prompt: None,
            },
        ]
    }
}

/// Validation limits applied before any network call
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    pub min_bytes: usize,
    pub min_duration_secs: f64,
    pub max_bytes: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_bytes: 1024,
            min_duration_secs: 0.5,
            max_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Transcription pipeline: validate, attempt in order, clean, accept
pub struct Transcriber {
    transport: Arc<dyn SpeechToText>,
    attempts: Vec<AttemptParams>,
    limits: ValidationLimits,
}

impl Transcriber {
    pub fn new(transport: Arc<dyn SpeechToText>) -> Self {
        Self {
            transport,
            attempts: AttemptParams::default_sequence(),
            limits: ValidationLimits::default(),
        }
    }

    pub fn with_attempts(mut self, attempts: Vec<AttemptParams>) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Transcribe a finished recording to cleaned text
    pub async fn transcribe(&self, recording: &Recording) -> Result<String, TranscribeError> {
        self.validate(recording)?;

        let mut last_service_error: Option<TranscribeError> = None;
        let mut any_response = false;

        for (index, params) in self.attempts.iter().enumerate() {
            info!(
                "Transcription attempt {}/{}: {}",
                index + 1,
                self.attempts.len(),
                params.label
            );

            match self.transport.transcribe(recording, params).await {
                Ok(raw) => {
                    any_response = true;
                    let cleaned = clean_transcript(&raw);
                    if cleaned.len() >= MIN_TRANSCRIPT_CHARS {
                        info!("Transcription accepted on attempt {}", index + 1);
                        return Ok(cleaned);
                    }
                    warn!("Attempt {} produced an empty transcript", index + 1);
                }
                Err(e) => {
                    warn!("Attempt {} failed: {}", index + 1, e);
                    last_service_error = Some(e);
                }
            }
        }

        // A placeholder string disguised as a transcript is never returned:
        // exhaustion is an explicit error
        if any_response {
            Err(TranscribeError::EmptyTranscription)
        } else {
            Err(last_service_error.unwrap_or(TranscribeError::EmptyTranscription))
        }
    }

    /// Pre-flight validation; fails fast without touching the network
    fn validate(&self, recording: &Recording) -> Result<(), TranscribeError> {
        let size = recording.bytes.len();

        if size < self.limits.min_bytes {
            return Err(TranscribeError::AudioTooShort(format!(
                "{} bytes (minimum {})",
                size, self.limits.min_bytes
            )));
        }

        if size > self.limits.max_bytes {
            return Err(TranscribeError::AudioTooLarge {
                size,
                max: self.limits.max_bytes,
            });
        }

        // Recordings from our own encoder carry a real duration; payloads
        // submitted from outside fall back to a bytes-per-second estimate
        let duration = if recording.duration_secs > 0.0 {
            recording.duration_secs
        } else {
            size as f64 / 1024.0
        };

        if duration < self.limits.min_duration_secs {
            return Err(TranscribeError::AudioTooShort(format!(
                "estimated {:.2}s (minimum {:.2}s)",
                duration, self.limits.min_duration_secs
            )));
        }

        Ok(())
    }
}

/// Sniff the MIME type of an audio payload from its leading byte signature
pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.len() >= 4 {
        if bytes[..4] == [0x1a, 0x45, 0xdf, 0xa3] {
            return "audio/webm";
        }
        if &bytes[..4] == b"RIFF" {
            return "audio/wav";
        }
        if bytes[..2] == [0xff, 0xfb] || bytes[..2] == [0xff, 0xf3] {
            return "audio/mpeg";
        }
    }
    "audio/webm"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_wav_signature() {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(sniff_mime_type(&bytes), "audio/wav");
    }

    #[test]
    fn sniffs_webm_signature() {
        let bytes = vec![0x1a, 0x45, 0xdf, 0xa3, 0, 0];
        assert_eq!(sniff_mime_type(&bytes), "audio/webm");
    }

    #[test]
    fn unknown_signature_defaults_to_webm() {
        assert_eq!(sniff_mime_type(&[1, 2, 3, 4, 5]), "audio/webm");
    }
}
