//! Spoken interviewer output
//!
//! Speech is best-effort: a missing synthesizer binary degrades to silence
//! with a warning and the interview continues as text.

use anyhow::Result;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

/// Voices tried in order; the first one the platform knows wins
pub const DEFAULT_VOICE_PREFERENCES: &[&str] = &["Google", "Microsoft", "Samantha", "Alex"];

/// Speaking-state transitions observable by the capture side
///
/// Capture pauses while the interviewer is speaking so the candidate's
/// recording never contains the synthesized question.
pub type SpeakingStateRx = watch::Receiver<bool>;

#[async_trait::async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak the text to completion, or return early if `stop` is called
    async fn speak(&self, text: &str) -> Result<()>;

    /// Cancel any in-flight utterance; idempotent
    async fn stop(&self);

    fn is_speaking(&self) -> bool;

    /// Subscribe to speaking-state transitions
    fn subscribe(&self) -> SpeakingStateRx;
}

/// Speech output backed by the platform synthesizer binary
///
/// Uses `say` on macOS and `espeak` elsewhere.
pub struct SystemSpeech {
    voice_preferences: Vec<String>,
    rate_wpm: u32,
    child: Arc<Mutex<Option<Child>>>,
    speaking_tx: watch::Sender<bool>,
    speaking_rx: watch::Receiver<bool>,
}

impl SystemSpeech {
    pub fn new(voice_preferences: Vec<String>, rate_wpm: u32) -> Self {
        let (speaking_tx, speaking_rx) = watch::channel(false);
        Self {
            voice_preferences,
            rate_wpm,
            child: Arc::new(Mutex::new(None)),
            speaking_tx,
            speaking_rx,
        }
    }

    #[cfg(target_os = "macos")]
    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new("say");
        if let Some(voice) = self.voice_preferences.first() {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("-r").arg(self.rate_wpm.to_string());
        cmd.arg(text);
        cmd
    }

    #[cfg(not(target_os = "macos"))]
    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new("espeak");
        if let Some(voice) = self.voice_preferences.first() {
            cmd.arg("-v").arg(voice.to_lowercase());
        }
        cmd.arg("-s").arg(self.rate_wpm.to_string());
        cmd.arg(text);
        cmd
    }
}

#[async_trait::async_trait]
impl SpeechOutput for SystemSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        // Replace any utterance already in flight
        self.stop().await;

        let mut cmd = self.command(text);
        let spawned = cmd.spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Speech synthesizer unavailable, continuing silently: {}", e);
                return Ok(());
            }
        };

        {
            let mut slot = self.child.lock().await;
            *slot = Some(child);
        }
        let _ = self.speaking_tx.send(true);
        debug!("Speaking {} characters", text.len());

        // Wait for the synthesizer to finish unless stop() takes the child
        loop {
            {
                let mut slot = self.child.lock().await;
                let finished = match slot.as_mut() {
                    Some(child) => match child.try_wait() {
                        Ok(Some(_status)) => true,
                        Ok(None) => false,
                        Err(e) => {
                            warn!("Speech process error: {}", e);
                            true
                        }
                    },
                    // stop() already took the child
                    None => break,
                };
                if finished {
                    *slot = None;
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        let _ = self.speaking_tx.send(false);
        Ok(())
    }

    async fn stop(&self) {
        let mut slot = self.child.lock().await;
        if let Some(mut child) = slot.take() {
            if let Err(e) = child.kill().await {
                warn!("Failed to stop speech process: {}", e);
            }
        }
        drop(slot);
        let _ = self.speaking_tx.send(false);
    }

    fn is_speaking(&self) -> bool {
        *self.speaking_rx.borrow()
    }

    fn subscribe(&self) -> SpeakingStateRx {
        self.speaking_rx.clone()
    }
}

/// No-op speech output for headless deployments and tests
pub struct NullSpeech {
    speaking_rx: watch::Receiver<bool>,
}

impl NullSpeech {
    pub fn new() -> Self {
        let (_tx, speaking_rx) = watch::channel(false);
        Self { speaking_rx }
    }
}

impl Default for NullSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SpeechOutput for NullSpeech {
    async fn speak(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }

    fn subscribe(&self) -> SpeakingStateRx {
        self.speaking_rx.clone()
    }
}
