use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

use super::backend::{AudioFrame, CaptureBackend};
use super::file::AudioFile;

/// Frame size emitted by the file backend (matches live capture latency)
const FRAME_MS: u64 = 100;

/// Capture backend that replays a WAV file as a stream of timed frames
///
/// Frames are emitted back-to-back without pacing; downstream consumers see
/// the same shape of stream a live device produces.
pub struct FileBackend {
    path: PathBuf,
    capturing: bool,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            capturing: false,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let audio = AudioFile::open(&self.path)
            .with_context(|| format!("Failed to open capture file {:?}", self.path))?;

        info!(
            "File backend streaming {:?} ({:.1}s)",
            self.path, audio.duration_seconds
        );

        let (tx, rx) = mpsc::channel(100);
        let samples_per_frame =
            (audio.sample_rate as u64 * FRAME_MS / 1000) as usize * audio.channels as usize;
        let sample_rate = audio.sample_rate;
        let channels = audio.channels;

        let task = tokio::spawn(async move {
            for (index, chunk) in audio.samples.chunks(samples_per_frame.max(1)).enumerate() {
                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate,
                    channels,
                    timestamp_ms: index as u64 * FRAME_MS,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        self.task = Some(task);
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn audio_tracks(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "file"
    }
}
