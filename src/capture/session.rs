use crate::audio::{sample_level, Analyser, AudioFrame, CaptureBackend, DeviceConfig, LevelMeter};
use crate::error::CaptureError;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Requested device tracks
    pub device: DeviceConfig,

    /// Sample rate for captured audio (STT services expect 16kHz)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// FFT window for the level analyser
    pub fft_size: usize,

    /// Level meter polling cadence in milliseconds
    pub level_poll_ms: u64,

    /// Level meter sensitivity in percent (10-500)
    pub sensitivity_percent: u32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            sample_rate: 16000,
            channels: 1,
            fft_size: 2048,
            level_poll_ms: 100,
            sensitivity_percent: crate::audio::DEFAULT_SENSITIVITY,
        }
    }
}

/// A finished recording: complete encoded bytes plus their MIME type
#[derive(Debug, Clone)]
pub struct Recording {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A recording session that owns the capture device lease
///
/// Holds the backend exclusively from `start` until `release`. Frames are
/// buffered for the final WAV blob while a concurrent task polls the
/// analyser for the loudness meter. `release` runs on every exit path and
/// is safe to call repeatedly.
pub struct RecordingSession {
    config: RecordingConfig,

    /// Capture backend (exclusive device lease)
    backend: Mutex<Box<dyn CaptureBackend>>,

    /// Whether recording is currently active
    active: Arc<AtomicBool>,

    /// Whether recording is paused (valid only while active)
    paused: Arc<AtomicBool>,

    /// Whether the device lease has been released
    released: AtomicBool,

    /// When the session started
    started_at: chrono::DateTime<chrono::Utc>,

    /// Buffered interleaved PCM samples
    samples: Arc<Mutex<Vec<i16>>>,

    /// Rolling analyser window feeding the level meter
    analyser: Arc<std::sync::Mutex<Analyser>>,

    /// Published loudness level
    meter: LevelMeter,

    /// User-adjustable sensitivity (percent)
    sensitivity: Arc<AtomicU32>,

    /// Wakes the capture task when stop runs against an idle backend
    shutdown: watch::Sender<bool>,

    /// Handle for the frame buffering task
    capture_task: Mutex<Option<JoinHandle<()>>>,

    /// Handle for the level monitor task
    level_task: Mutex<Option<JoinHandle<()>>>,
}

impl RecordingSession {
    /// Acquire the device and start recording
    pub async fn start(
        mut backend: Box<dyn CaptureBackend>,
        config: RecordingConfig,
    ) -> Result<Self, CaptureError> {
        if config.device.audio && backend.audio_tracks() == 0 {
            // Requested audio with zero tracks is a hard failure, never a
            // silent continue
            return Err(CaptureError::DeviceUnavailable(format!(
                "no audio track available on backend '{}'",
                backend.name()
            )));
        }

        info!("Starting recording session on backend '{}'", backend.name());

        let mut frame_rx = backend
            .start()
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let active = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(false));
        let samples = Arc::new(Mutex::new(Vec::new()));
        let analyser = Arc::new(std::sync::Mutex::new(Analyser::new(
            config.fft_size,
            config.sample_rate,
        )));
        let meter = LevelMeter::new();
        let sensitivity = Arc::new(AtomicU32::new(config.sensitivity_percent));
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        // Frame buffering task; the shutdown branch lets stop() finalize
        // even when the backend stays open but delivers no further frames
        let task_active = Arc::clone(&active);
        let task_paused = Arc::clone(&paused);
        let task_samples = Arc::clone(&samples);
        let task_analyser = Arc::clone(&analyser);
        let channels = config.channels;

        let capture_task = tokio::spawn(async move {
            debug!("Capture task started");

            loop {
                let frame = tokio::select! {
                    // Drain frames already queued before honoring shutdown
                    biased;
                    frame = frame_rx.recv() => match frame {
                        Some(frame) => frame,
                        None => break,
                    },
                    _ = shutdown_rx.changed() => break,
                };

                if !task_active.load(Ordering::SeqCst) {
                    break;
                }
                if task_paused.load(Ordering::SeqCst) {
                    continue;
                }

                {
                    let mono = Self::downmix(&frame, channels);
                    let mut guard = task_analyser.lock().unwrap();
                    guard.push(&mono);
                }

                let mut buffer = task_samples.lock().await;
                buffer.extend_from_slice(&frame.samples);
            }

            debug!("Capture task stopped");
        });

        // Level monitor task: polls the analyser on a fixed cadence and
        // stops scheduling itself the instant the session goes inactive
        let poll_active = Arc::clone(&active);
        let poll_analyser = Arc::clone(&analyser);
        let poll_meter = meter.clone();
        let poll_sensitivity = Arc::clone(&sensitivity);
        let poll_ms = config.level_poll_ms;

        let level_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(poll_ms));
            loop {
                ticker.tick().await;
                if !poll_active.load(Ordering::SeqCst) {
                    break;
                }
                let snapshot = {
                    let guard = poll_analyser.lock().unwrap();
                    guard.snapshot()
                };
                let level = sample_level(&snapshot, poll_sensitivity.load(Ordering::Relaxed));
                poll_meter.set(level);
            }
            poll_meter.set(0.0);
        });

        Ok(Self {
            config,
            backend: Mutex::new(backend),
            active,
            paused,
            released: AtomicBool::new(false),
            started_at: chrono::Utc::now(),
            samples,
            analyser,
            meter,
            sensitivity,
            shutdown,
            capture_task: Mutex::new(Some(capture_task)),
            level_task: Mutex::new(Some(level_task)),
        })
    }

    /// Pause recording; a no-op unless the session is active and unpaused
    pub fn pause(&self) {
        if self.active.load(Ordering::SeqCst) && !self.paused.swap(true, Ordering::SeqCst) {
            info!("Recording paused");
        }
    }

    /// Resume recording; a no-op unless the session is active and paused
    pub fn resume(&self) {
        if self.active.load(Ordering::SeqCst) && self.paused.swap(false, Ordering::SeqCst) {
            info!("Recording resumed");
        }
    }

    /// Finalize the encoder and return the complete recording
    ///
    /// Does not release the device lease, so a new recording can start
    /// immediately in the same surface. A session that captured nothing
    /// surfaces `RecordingError` rather than an empty blob.
    pub async fn stop(&self) -> Result<Recording, CaptureError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::Recording(
                "no active recording to stop".to_string(),
            ));
        }

        info!("Stopping recording session");
        self.paused.store(false, Ordering::SeqCst);
        let _ = self.shutdown.send(true);

        // Wait for buffered frames to flush
        if let Some(task) = self.capture_task.lock().await.take() {
            if let Err(e) = task.await {
                warn!("Capture task panicked: {}", e);
            }
        }

        let pcm = {
            let mut buffer = self.samples.lock().await;
            std::mem::take(&mut *buffer)
        };

        if pcm.is_empty() {
            return Err(CaptureError::Recording(
                "encoder produced no audio data".to_string(),
            ));
        }

        let bytes =
            crate::audio::file::encode_wav(&pcm, self.config.sample_rate, self.config.channels)
                .map_err(|e| CaptureError::Recording(e.to_string()))?;

        let duration_secs =
            pcm.len() as f64 / (self.config.sample_rate as f64 * self.config.channels as f64);

        info!(
            "Recording complete: {:.1}s, {} bytes",
            duration_secs,
            bytes.len()
        );

        Ok(Recording {
            bytes,
            mime_type: "audio/wav".to_string(),
            duration_secs,
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
        })
    }

    /// Stop all device tracks and tear down monitoring
    ///
    /// Idempotent; runs on every exit path (manual stop, error, teardown).
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Releasing recording session");
        self.active.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        let _ = self.shutdown.send(true);

        if let Some(task) = self.capture_task.lock().await.take() {
            task.abort();
        }
        if let Some(task) = self.level_task.lock().await.take() {
            task.abort();
        }

        if let Err(e) = self.backend.lock().await.stop().await {
            warn!("Failed to stop capture backend: {}", e);
        }

        self.meter.set(0.0);
    }

    /// Adjust the level meter sensitivity (percent, clamped to 10-500)
    pub fn set_sensitivity(&self, percent: u32) {
        let clamped = percent.clamp(crate::audio::MIN_SENSITIVITY, crate::audio::MAX_SENSITIVITY);
        self.sensitivity.store(clamped, Ordering::Relaxed);
    }

    /// Shared handle to the live loudness meter
    pub fn meter(&self) -> LevelMeter {
        self.meter.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.started_at
    }

    /// Seconds of audio captured so far
    pub async fn elapsed_secs(&self) -> f64 {
        let buffer = self.samples.lock().await;
        buffer.len() as f64 / (self.config.sample_rate as f64 * self.config.channels as f64)
    }

    /// Average channels down to mono for the analyser window
    fn downmix(frame: &AudioFrame, channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return frame.samples.clone();
        }
        frame
            .samples
            .chunks_exact(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if !self.released.load(Ordering::SeqCst) {
            warn!("RecordingSession dropped without release; aborting tasks");
            self.active.store(false, Ordering::SeqCst);
            if let Ok(mut guard) = self.capture_task.try_lock() {
                if let Some(task) = guard.take() {
                    task.abort();
                }
            }
            if let Ok(mut guard) = self.level_task.try_lock() {
                if let Some(task) = guard.take() {
                    task.abort();
                }
            }
        }
    }
}
