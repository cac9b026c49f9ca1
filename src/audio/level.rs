use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::analyser::AnalyserSnapshot;

/// Sensitivity bounds exposed to the user (percent)
pub const MIN_SENSITIVITY: u32 = 10;
pub const MAX_SENSITIVITY: u32 = 500;
pub const DEFAULT_SENSITIVITY: u32 = 100;

/// Lower band edge of the speech range in Hz
const SPEECH_BAND_LOW_HZ: f32 = 300.0;
/// Upper band edge of the speech range in Hz
const SPEECH_BAND_HIGH_HZ: f32 = 3400.0;
/// Time-domain deviation from center (128) that counts as a peak
const PEAK_THRESHOLD: i32 = 16;

// Per-heuristic gains, tuned so a normal speaking level reads mid-meter.
const GAIN_RMS: f32 = 1.0;
const GAIN_MEAN_BIN: f32 = 0.5;
const GAIN_PEAK_BIN: f32 = 0.3;
const GAIN_PEAK_SAMPLE: f32 = 0.5;
const GAIN_SPEECH_BAND: f32 = 1.0;
const GAIN_PEAK_COUNT: f32 = 2.0;

/// Compute a normalized loudness level in [0,1] from an analyser snapshot
///
/// Several heuristics run side by side and the maximum wins: any single one
/// under-detects certain speech patterns (sibilants, plosives, soft vowels).
/// `sensitivity` is a percent multiplier (10-500, default 100) applied
/// linearly to every heuristic before the max is taken.
pub fn sample_level(snapshot: &AnalyserSnapshot, sensitivity: u32) -> f32 {
    let bins = &snapshot.frequency_bins;
    let time = &snapshot.time_domain;
    if bins.is_empty() || time.is_empty() {
        return 0.0;
    }

    let s = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY) as f32 / 100.0;
    let bin_count = bins.len() as f32;

    // RMS energy over the frequency bins
    let rms = (bins
        .iter()
        .map(|&b| {
            let v = b as f32 / 255.0;
            v * v
        })
        .sum::<f32>()
        / bin_count)
        .sqrt()
        * GAIN_RMS;

    // Mean bin amplitude
    let mean_bin =
        bins.iter().map(|&b| b as f32).sum::<f32>() / bin_count / 255.0 * GAIN_MEAN_BIN;

    // Peak frequency bin
    let peak_bin =
        bins.iter().copied().max().unwrap_or(0) as f32 / 255.0 * GAIN_PEAK_BIN;

    // Peak time-domain deviation from center
    let peak_sample = time
        .iter()
        .map(|&v| (v as i32 - 128).unsigned_abs())
        .max()
        .unwrap_or(0) as f32
        / 128.0
        * GAIN_PEAK_SAMPLE;

    // Energy restricted to the speech band
    let nyquist = snapshot.sample_rate as f32 / 2.0;
    let band_start = ((SPEECH_BAND_LOW_HZ / nyquist) * bin_count) as usize;
    let band_end = (((SPEECH_BAND_HIGH_HZ / nyquist) * bin_count) as usize).min(bins.len());
    let speech_band = if band_start < band_end {
        bins[band_start..band_end]
            .iter()
            .map(|&b| b as f32)
            .sum::<f32>()
            / (band_end - band_start) as f32
            / 255.0
            * GAIN_SPEECH_BAND
    } else {
        0.0
    };

    // Threshold-crossing peak count over the time-domain buffer
    let peaks = time
        .iter()
        .filter(|&&v| (v as i32 - 128).abs() > PEAK_THRESHOLD)
        .count() as f32
        / time.len() as f32
        * GAIN_PEAK_COUNT;

    let level = [rms, mean_bin, peak_bin, peak_sample, speech_band, peaks]
        .into_iter()
        .fold(0.0f32, f32::max)
        * s;

    level.clamp(0.0, 1.0)
}

/// Lock-free loudness meter shared between the monitor task and readers
#[derive(Clone, Debug)]
pub struct LevelMeter {
    level_bits: Arc<AtomicU32>,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self {
            level_bits: Arc::new(AtomicU32::new(0f32.to_bits())),
        }
    }

    pub fn set(&self, level: f32) {
        self.level_bits.store(level.to_bits(), Ordering::Relaxed);
    }

    /// Current level in [0,1]
    pub fn level(&self) -> f32 {
        f32::from_bits(self.level_bits.load(Ordering::Relaxed))
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}
