//! Audio Buffer
//!
//! Mono sample buffer owned by a single render. Samples are `f32` in the
//! nominal range [-1.0, 1.0]; stages may push them past that range and the
//! final normalizer pulls them back.

use std::f64::consts::PI;

// ============================================================================
// Helper Functions
// ============================================================================

/// Peak absolute value of a sample slice (0.0 for empty input)
#[inline]
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Scale samples so their peak becomes `target`; silent input is untouched
pub fn scale_to_peak(samples: &mut [f32], target: f32) {
    let peak = peak_abs(samples);
    if peak > 0.0 && peak.is_finite() {
        let gain = target / peak;
        for s in samples.iter_mut() {
            *s *= gain;
        }
    }
}

// ============================================================================
// AudioBuffer
// ============================================================================

/// Mono audio at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Silent buffer of `num_samples`
    pub fn silence(num_samples: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; num_samples], sample_rate)
    }

    /// Silent buffer lasting `duration_secs`
    pub fn silence_secs(duration_secs: f64, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f64).round() as usize;
        Self::silence(num_samples, sample_rate)
    }

    /// Pure sine, phase zero at sample 0
    pub fn sine_wave(freq_hz: f64, amplitude: f64, num_samples: usize, sample_rate: u32) -> Self {
        let sr = sample_rate as f64;
        let samples = (0..num_samples)
            .map(|i| (amplitude * (2.0 * PI * freq_hz * i as f64 / sr).sin()) as f32)
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Unit impulse at sample 0 followed by silence
    pub fn impulse(num_samples: usize, sample_rate: u32) -> Self {
        let mut buffer = Self::silence(num_samples, sample_rate);
        if let Some(first) = buffer.samples.first_mut() {
            *first = 1.0;
        }
        buffer
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        peak_abs(&self.samples)
    }

    /// Scale the whole buffer so its peak equals `target`
    pub fn normalize_peak(&mut self, target: f32) {
        scale_to_peak(&mut self.samples, target);
    }

    /// True if no sample is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Bit-for-bit equality of sample data and rate
    pub fn is_identical_to(&self, other: &AudioBuffer) -> bool {
        self.sample_rate == other.sample_rate
            && self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(other.samples.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Sample-wise equality within `tolerance`
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        self.sample_rate == other.sample_rate
            && self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(other.samples.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
