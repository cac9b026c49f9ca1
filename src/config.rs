use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub dialogue: DialogueConfig,
    pub speech: SpeechConfig,
    pub interview: InterviewPolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// FFT window for the level analyser
    pub fft_size: usize,
    /// Level meter polling cadence in milliseconds
    pub level_poll_ms: u64,
    /// Level meter sensitivity in percent (10-500)
    pub sensitivity_percent: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub model: String,
    /// Recordings smaller than this are rejected before any network call
    pub min_audio_bytes: usize,
    /// Recordings estimated shorter than this are rejected
    pub min_duration_secs: f64,
    /// Service upload limit
    pub max_audio_bytes: usize,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    pub api_base: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Voice names tried in order; the platform default is used when none match
    pub voice_preferences: Vec<String>,
    /// Speaking rate in words per minute
    pub rate_wpm: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewPolicyConfig {
    /// No interview ends before this many questions
    pub min_questions: u32,
    /// Every interview ends at this many questions
    pub max_questions: u32,
    /// Per-turn probability of ending once min_questions is reached
    pub end_probability: f64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
