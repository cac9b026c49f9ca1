//! Recording session management
//!
//! This module provides the `RecordingSession` abstraction that manages:
//! - Exclusive acquisition and release of the capture device lease
//! - Frame buffering and WAV finalization
//! - Live loudness monitoring while recording
//! - Pause/resume and idempotent teardown

mod session;

pub use session::{Recording, RecordingConfig, RecordingSession};
