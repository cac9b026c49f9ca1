use realfft::{RealFftPlanner, RealToComplex};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

/// A point-in-time view of the live audio signal
///
/// Mirrors the byte-array shape of a platform analyser node: frequency bin
/// magnitudes in [0,255] and time-domain samples centered on 128.
#[derive(Debug, Clone)]
pub struct AnalyserSnapshot {
    pub frequency_bins: Vec<u8>,
    pub time_domain: Vec<u8>,
    pub sample_rate: u32,
}

impl AnalyserSnapshot {
    /// A silent snapshot (flat spectrum, centered time domain)
    pub fn silence(fft_size: usize, sample_rate: u32) -> Self {
        Self {
            frequency_bins: vec![0; fft_size / 2],
            time_domain: vec![128; fft_size],
            sample_rate,
        }
    }
}

/// Rolling FFT analyser over the most recent capture window
pub struct Analyser {
    fft_size: usize,
    sample_rate: u32,
    window: VecDeque<i16>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl Analyser {
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(fft_size);
        Self {
            fft_size,
            sample_rate,
            window: VecDeque::with_capacity(fft_size),
            fft,
        }
    }

    /// Feed mono samples into the rolling window
    pub fn push(&mut self, samples: &[i16]) {
        for &sample in samples {
            if self.window.len() == self.fft_size {
                self.window.pop_front();
            }
            self.window.push_back(sample);
        }
    }

    /// Compute the current snapshot (time domain + Hann-windowed spectrum)
    pub fn snapshot(&self) -> AnalyserSnapshot {
        let mut input = vec![0.0f32; self.fft_size];
        let offset = self.fft_size - self.window.len();
        for (i, &sample) in self.window.iter().enumerate() {
            input[offset + i] = sample as f32 / i16::MAX as f32;
        }

        let time_domain: Vec<u8> = input
            .iter()
            .map(|&s| ((s * 127.0) + 128.0).clamp(0.0, 255.0) as u8)
            .collect();

        // Hann window before the transform
        let n = self.fft_size as f32;
        for (i, sample) in input.iter_mut().enumerate() {
            let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1.0)).cos());
            *sample *= w;
        }

        let mut spectrum = self.fft.make_output_vec();
        // process only fails on length mismatch, which the sizes above rule out
        let _ = self.fft.process(&mut input, &mut spectrum);

        let scale = 2.0 / self.fft_size as f32;
        let frequency_bins: Vec<u8> = spectrum
            .iter()
            .take(self.fft_size / 2)
            .map(|c| {
                let magnitude = (c.re * c.re + c.im * c.im).sqrt() * scale;
                (magnitude * 255.0).clamp(0.0, 255.0) as u8
            })
            .collect();

        AnalyserSnapshot {
            frequency_bins,
            time_domain,
            sample_rate: self.sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
