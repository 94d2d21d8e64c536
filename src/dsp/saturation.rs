//! Soft saturation
//!
//! `out = tanh(drive * in)`. Output is bounded to (-1, 1) for any drive.

use serde_json::{json, Value};

use crate::dsp::effect::Effect;
use crate::engine::AudioBuffer;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SoftClip {
    drive: f64,
}

impl SoftClip {
    pub fn new(drive: f64) -> Self {
        Self { drive }
    }

    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        (self.drive * x as f64).tanh() as f32
    }
}

impl Effect for SoftClip {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        for sample in buffer.samples_mut() {
            *sample = self.shape(*sample);
        }
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "distortion"
    }

    fn get_params(&self) -> Value {
        json!({ "drive": self.drive })
    }
}
