use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Requested device tracks for a recording session
#[derive(Debug, Clone, Copy)]
pub struct DeviceConfig {
    pub video: bool,
    pub audio: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            video: false,
            audio: true,
        }
    }
}

/// Audio capture backend trait
///
/// The physical device (microphone, browser media stream, file) lives behind
/// this seam. Implementations:
/// - `FileBackend`: streams a WAV file in real-time sized frames (testing,
///   batch processing)
/// - `ChannelBackend`: frames pushed by the caller (tests, embedding)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Number of audio tracks this backend can deliver
    ///
    /// A session that requests audio fails with `DeviceUnavailable` when
    /// this is zero.
    fn audio_tracks(&self) -> usize;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Microphone input (delegated to the embedding platform)
    Microphone,
    /// File input (for testing/batch processing)
    File(PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(source: AudioSource) -> Result<Box<dyn CaptureBackend>> {
        match source {
            AudioSource::File(path) => {
                let backend = super::file_backend::FileBackend::new(path);
                Ok(Box::new(backend))
            }

            AudioSource::Microphone => {
                // Device acquisition belongs to the embedding platform
                // (browser getUserMedia, native capture layer). Embedders
                // provide a CaptureBackend; there is no built-in mic path.
                anyhow::bail!(
                    "microphone capture requires a platform-provided CaptureBackend"
                )
            }
        }
    }
}

/// Backend fed by the caller through an mpsc channel
///
/// Useful for tests and for embedders that already own a capture pipeline.
pub struct ChannelBackend {
    rx: Option<mpsc::Receiver<AudioFrame>>,
    audio_tracks: usize,
    capturing: bool,
}

impl ChannelBackend {
    /// Create a backend and the sender used to feed it frames
    pub fn new(buffer: usize) -> (Self, mpsc::Sender<AudioFrame>) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            Self {
                rx: Some(rx),
                audio_tracks: 1,
                capturing: false,
            },
            tx,
        )
    }

    /// Create a backend that reports no audio tracks (device without a mic)
    pub fn without_audio(buffer: usize) -> (Self, mpsc::Sender<AudioFrame>) {
        let (mut backend, tx) = Self::new(buffer);
        backend.audio_tracks = 0;
        (backend, tx)
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ChannelBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let rx = self
            .rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("channel backend already started"))?;
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn audio_tracks(&self) -> usize {
        self.audio_tracks
    }

    fn name(&self) -> &str {
        "channel"
    }
}
