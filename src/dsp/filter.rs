//! Butterworth filters
//!
//! 4th-order lowpass/highpass built as a cascade of two RBJ biquads whose
//! Q values place the poles on the Butterworth circle. The cutoff is
//! normalised against Nyquist and clamped into `[1e-6, 0.999]` so the
//! bilinear transform always yields a stable filter.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::dsp::effect::Effect;
use crate::engine::AudioBuffer;
use crate::error::Result;

/// Lower bound of the normalised cutoff
pub const MIN_NORMALIZED_CUTOFF: f64 = 1e-6;

/// Upper bound of the normalised cutoff
pub const MAX_NORMALIZED_CUTOFF: f64 = 0.999;

/// Q of each biquad section for a 4th-order Butterworth response,
/// `1 / (2 cos(theta))` for pole angles pi/8 and 3pi/8
const BUTTERWORTH_Q: [f64; 2] = [0.541_196_100_146_197, 1.306_562_964_876_376_6];

/// Filter response shape
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    LowPass,
    HighPass,
}

impl FilterKind {
    fn as_str(self) -> &'static str {
        match self {
            FilterKind::LowPass => "lowpass",
            FilterKind::HighPass => "highpass",
        }
    }
}

/// Cutoff as a fraction of Nyquist, clamped for stability
pub fn normalized_cutoff(cutoff_hz: f64, sample_rate: u32) -> f64 {
    let nyquist = sample_rate as f64 / 2.0;
    let wn = if nyquist > 0.0 { cutoff_hz / nyquist } else { 0.0 };
    if wn.is_finite() {
        wn.clamp(MIN_NORMALIZED_CUTOFF, MAX_NORMALIZED_CUTOFF)
    } else {
        MAX_NORMALIZED_CUTOFF
    }
}

// ============================================================================
// Biquad section
// ============================================================================

/// Normalised biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    /// Audio EQ Cookbook lowpass/highpass at normalised cutoff `wn`
    fn calculate(kind: FilterKind, wn: f64, q: f64) -> Self {
        let w0 = PI * wn;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match kind {
            FilterKind::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterKind::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Direct form I history
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    #[inline]
    fn process(&mut self, c: &BiquadCoeffs, x: f64) -> f64 {
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

// ============================================================================
// ButterworthFilter
// ============================================================================

/// 4th-order Butterworth lowpass or highpass
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    kind: FilterKind,
    cutoff_hz: f64,
    sample_rate: u32,
    sections: [(BiquadCoeffs, BiquadState); 2],
}

impl ButterworthFilter {
    pub fn new(kind: FilterKind, cutoff_hz: f64, sample_rate: u32) -> Self {
        let wn = normalized_cutoff(cutoff_hz, sample_rate);
        let sections = BUTTERWORTH_Q.map(|q| (BiquadCoeffs::calculate(kind, wn, q), BiquadState::default()));
        Self {
            kind,
            cutoff_hz,
            sample_rate,
            sections,
        }
    }

    pub fn lowpass(cutoff_hz: f64, sample_rate: u32) -> Self {
        Self::new(FilterKind::LowPass, cutoff_hz, sample_rate)
    }

    pub fn highpass(cutoff_hz: f64, sample_rate: u32) -> Self {
        Self::new(FilterKind::HighPass, cutoff_hz, sample_rate)
    }

    /// Filter a slice in place, continuing from the current state
    pub fn process_slice(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            let mut y = *sample as f64;
            for (coeffs, state) in self.sections.iter_mut() {
                y = state.process(coeffs, y);
            }
            *sample = y as f32;
        }
    }

    pub fn reset(&mut self) {
        for (_, state) in self.sections.iter_mut() {
            *state = BiquadState::default();
        }
    }
}

// ============================================================================
// GlobalFilter
// ============================================================================

/// Whole-buffer filtering stage
#[derive(Debug, Clone)]
pub struct GlobalFilter {
    filter: ButterworthFilter,
}

impl GlobalFilter {
    pub fn lowpass(cutoff_hz: f64, sample_rate: u32) -> Self {
        Self {
            filter: ButterworthFilter::lowpass(cutoff_hz, sample_rate),
        }
    }

    pub fn highpass(cutoff_hz: f64, sample_rate: u32) -> Self {
        Self {
            filter: ButterworthFilter::highpass(cutoff_hz, sample_rate),
        }
    }
}

impl Effect for GlobalFilter {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        self.filter.process_slice(buffer.samples_mut());
        Ok(())
    }

    fn reset(&mut self) {
        self.filter.reset();
    }

    fn effect_type(&self) -> &'static str {
        match self.filter.kind {
            FilterKind::LowPass => "global_lowpass",
            FilterKind::HighPass => "global_highpass",
        }
    }

    fn get_params(&self) -> Value {
        json!({
            "kind": self.filter.kind.as_str(),
            "cutoff_hz": self.filter.cutoff_hz,
            "sample_rate": self.filter.sample_rate,
        })
    }
}
