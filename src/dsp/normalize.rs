//! Final safety normalisation
//!
//! Always the last stage. A buffer whose peak is above 0.95 is scaled so
//! the peak becomes exactly 0.95; quieter buffers pass through untouched.
//! Anything that clipped past 1.0 therefore always ends at 0.95.

use serde_json::{json, Value};

use crate::dsp::effect::Effect;
use crate::engine::AudioBuffer;
use crate::error::Result;

/// Peak every rendered buffer is held to
pub const TARGET_PEAK: f32 = 0.95;

#[derive(Debug, Clone, Default)]
pub struct SafetyNormalizer;

impl Effect for SafetyNormalizer {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        if buffer.peak() > TARGET_PEAK {
            buffer.normalize_peak(TARGET_PEAK);
        }
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "normalize"
    }

    fn get_params(&self) -> Value {
        json!({ "target_peak": TARGET_PEAK })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scales_clipped_buffer() {
        let mut buffer = AudioBuffer::new(vec![0.2, -3.0, 1.5], 8000);
        SafetyNormalizer.process(&mut buffer).unwrap();
        assert_relative_eq!(buffer.peak(), TARGET_PEAK, epsilon = 1e-6);
        assert_relative_eq!(buffer.samples()[2], 0.475, epsilon = 1e-6);
    }

    #[test]
    fn test_pulls_near_full_scale_down() {
        let mut buffer = AudioBuffer::new(vec![0.5, -0.99], 8000);
        SafetyNormalizer.process(&mut buffer).unwrap();
        assert_relative_eq!(buffer.peak(), TARGET_PEAK, epsilon = 1e-6);
    }

    #[test]
    fn test_leaves_quiet_buffer() {
        let original = AudioBuffer::new(vec![0.2, -0.95, 0.1], 8000);
        let mut buffer = original.clone();
        SafetyNormalizer.process(&mut buffer).unwrap();
        assert!(buffer.is_identical_to(&original));
    }
}
