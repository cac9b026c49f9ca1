pub mod analyser;
pub mod backend;
pub mod file;
pub mod file_backend;
pub mod level;

pub use analyser::{Analyser, AnalyserSnapshot};
pub use backend::{
    AudioFrame, AudioSource, CaptureBackend, CaptureBackendFactory, ChannelBackend, DeviceConfig,
};
pub use file::{encode_wav, AudioFile};
pub use file_backend::FileBackend;
pub use level::{sample_level, LevelMeter, DEFAULT_SENSITIVITY, MAX_SENSITIVITY, MIN_SENSITIVITY};
