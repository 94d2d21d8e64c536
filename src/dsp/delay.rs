//! Feedback Delay
//!
//! Feedback comb delay computed as a causal recurrence over the buffer:
//! `out[i] += feedback * out[i - d]` for every `i >= d`. Each output sample
//! depends on one already updated `d` samples back, so the pass is strictly
//! sequential.

use serde_json::{json, Value};

use crate::dsp::effect::Effect;
use crate::engine::buffer::{peak_abs, scale_to_peak};
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::patch::DelayParams;

/// Peak above which the delay output is rescaled
pub const RENORMALIZE_THRESHOLD: f32 = 1.0;

/// Peak the delay output is rescaled to
pub const RENORMALIZE_TARGET: f32 = 0.95;

/// Delay length in samples for `ms` at `sample_rate`, at least one sample
pub fn delay_samples(ms: u32, sample_rate: u32) -> usize {
    let d = (ms as f64 * sample_rate as f64 / 1000.0).round() as usize;
    d.max(1)
}

/// Apply the feedback recurrence in place
pub fn apply_feedback(samples: &mut [f32], delay: usize, feedback: f32) {
    if delay == 0 || delay >= samples.len() {
        return;
    }
    for i in delay..samples.len() {
        samples[i] += feedback * samples[i - delay];
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    ms: u32,
    feedback: f64,
}

impl FeedbackDelay {
    pub fn new(params: &DelayParams) -> Self {
        Self {
            ms: params.ms,
            feedback: params.feedback,
        }
    }
}

impl Effect for FeedbackDelay {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        let d = delay_samples(self.ms, buffer.sample_rate());
        let samples = buffer.samples_mut();
        apply_feedback(samples, d, self.feedback as f32);

        let peak = peak_abs(samples);
        if peak > RENORMALIZE_THRESHOLD {
            scale_to_peak(samples, RENORMALIZE_TARGET);
        }
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "delay"
    }

    fn get_params(&self) -> Value {
        json!({
            "ms": self.ms,
            "feedback": self.feedback,
        })
    }
}
