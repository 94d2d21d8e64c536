//! Additive Gaussian noise
//!
//! Adds zero-mean noise with standard deviation `amp` on top of the current
//! buffer. The random source is injected so renders can be reproduced.

use std::f64::consts::PI;

use rand::{Rng, RngCore};
use serde_json::{json, Value};

use crate::dsp::effect::Effect;
use crate::engine::AudioBuffer;
use crate::error::Result;

/// Standard normal sample via Box-Muller
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); keep u1 away from zero for the log
    let u1 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub struct NoiseLayer<'a> {
    amp: f64,
    rng: &'a mut (dyn RngCore + Send),
}

impl<'a> NoiseLayer<'a> {
    pub fn new(amp: f64, rng: &'a mut (dyn RngCore + Send)) -> Self {
        Self { amp, rng }
    }
}

impl Effect for NoiseLayer<'_> {
    fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        for sample in buffer.samples_mut() {
            *sample += (self.amp * standard_normal(&mut *self.rng)) as f32;
        }
        Ok(())
    }

    fn effect_type(&self) -> &'static str {
        "noise"
    }

    fn get_params(&self) -> Value {
        json!({ "amp": self.amp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn noisy(seed: u64, amp: f64, len: usize) -> AudioBuffer {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut buffer = AudioBuffer::silence(len, 22050);
        NoiseLayer::new(amp, &mut rng).process(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_statistics() {
        let buffer = noisy(1, 0.1, 50_000);
        let n = buffer.len() as f64;
        let mean = buffer.samples().iter().map(|&s| s as f64).sum::<f64>() / n;
        let var = buffer
            .samples()
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        assert!(mean.abs() < 0.005, "mean {}", mean);
        assert!((var.sqrt() - 0.1).abs() < 0.005, "std {}", var.sqrt());
    }

    #[test]
    fn test_same_seed_same_noise() {
        assert!(noisy(42, 0.01, 1000).is_identical_to(&noisy(42, 0.01, 1000)));
        assert!(!noisy(42, 0.01, 1000).is_identical_to(&noisy(43, 0.01, 1000)));
    }

    #[test]
    fn test_zero_amp_is_silent() {
        assert_eq!(noisy(7, 0.0, 256).peak(), 0.0);
    }

    #[test]
    fn test_additive_on_signal() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut buffer = AudioBuffer::new(vec![0.5; 512], 22050);
        NoiseLayer::new(0.001, &mut rng).process(&mut buffer).unwrap();
        assert!(buffer.samples().iter().all(|s| (s - 0.5).abs() < 0.01));
    }
}
