//! Sub-sine layer
//!
//! Synthesises a pure sine for the full buffer, optionally lowpassed on its
//! own, and blends it under the dry signal:
//! `out = dry * mix + sine * (1 - mix)`.

use serde_json::{json, Value};

use crate::dsp::effect::Effect;
use crate::dsp::filter::ButterworthFilter;
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::patch::SubSineParams;

#[derive(Debug, Clone)]
pub struct SubSineLayer {
    freq_hz: f64,
    amp: f64,
    lowpass_cutoff: Option<f64>,
    mix_ratio: f32,
}

impl SubSineLayer {
    pub fn new(params: &SubSineParams, mix_ratio: f32) -> Self {
        Self {
            freq_hz: params.freq_hz,
            amp: params.amp,
            lowpass_cutoff: params.lowpass_cutoff,
            mix_ratio,
        }
    }

    /// The sine layer alone, before blending
    pub fn render_layer(&self, num_samples: usize, sample_rate: u32) -> Vec<f32> {
        let mut sine =
            AudioBuffer::sine_wave(self.freq_hz, self.amp, num_samples, sample_rate).into_samples();
        if let Some(cutoff) = self.lowpass_cutoff {
            ButterworthFilter::lowpass(cutoff, sample_rate).process_slice(&mut sine);
        }
        sine
    }
}

impl Effect for SubSineLayer {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        let sine = self.render_layer(buffer.len(), buffer.sample_rate());
        let dry = self.mix_ratio;
        let wet = 1.0 - self.mix_ratio;
        for (sample, layer) in buffer.samples_mut().iter_mut().zip(sine) {
            *sample = *sample * dry + layer * wet;
        }
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "sub_sine"
    }

    fn get_params(&self) -> Value {
        json!({
            "freq_hz": self.freq_hz,
            "amp": self.amp,
            "lowpass_cutoff": self.lowpass_cutoff,
            "mix_ratio": self.mix_ratio,
        })
    }
}
