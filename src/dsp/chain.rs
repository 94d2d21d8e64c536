//! Effect Chain
//!
//! The stage order is fixed:
//! 1. Sub-sine layer
//! 2. Noise
//! 3. Distortion
//! 4. Global lowpass, then global highpass
//! 5. Feedback delay
//! 6. Safety normalisation (always)
//!
//! Each stage is pushed only when its parameters enable it. After every
//! stage the buffer is checked for NaN/Inf so corrupt audio is never
//! written.

use log::debug;
use rand::RngCore;
use serde_json::Value;

use super::{Effect, FeedbackDelay, GlobalFilter, NoiseLayer, SafetyNormalizer, SoftClip, SubSineLayer};
use crate::engine::AudioBuffer;
use crate::error::{PatchbayError, Result};
use crate::patch::ParameterSet;

/// Ordered list of stages for one render
pub struct EffectChain<'a> {
    effects: Vec<Box<dyn Effect + 'a>>,
}

impl<'a> EffectChain<'a> {
    /// Build the chain for an already clamped parameter set
    pub fn for_patch(
        params: &ParameterSet,
        mix_ratio: f32,
        sample_rate: u32,
        rng: &'a mut (dyn RngCore + Send),
    ) -> Self {
        let mut effects: Vec<Box<dyn Effect + 'a>> = Vec::new();

        if let Some(sub) = params.sub_sine.as_ref().filter(|s| s.enabled) {
            effects.push(Box::new(SubSineLayer::new(sub, mix_ratio)));
        }
        if let Some(noise) = params.noise.as_ref().filter(|n| n.enabled) {
            effects.push(Box::new(NoiseLayer::new(noise.amp, rng)));
        }
        if let Some(dist) = params.distortion.as_ref().filter(|d| d.enabled) {
            effects.push(Box::new(SoftClip::new(dist.drive)));
        }
        if let Some(cutoff) = params.global_lowpass {
            effects.push(Box::new(GlobalFilter::lowpass(cutoff, sample_rate)));
        }
        if let Some(cutoff) = params.global_highpass {
            effects.push(Box::new(GlobalFilter::highpass(cutoff, sample_rate)));
        }
        if let Some(delay) = params.delay.as_ref().filter(|d| d.enabled) {
            effects.push(Box::new(FeedbackDelay::new(delay)));
        }
        effects.push(Box::new(SafetyNormalizer));

        Self { effects }
    }

    /// Run every stage in order, starting from cleared stage state
    ///
    /// # Errors
    /// `DspOverflow` naming the first stage that left NaN/Inf in the buffer.
    pub fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        self.reset();
        for effect in &mut self.effects {
            debug!("Applying {} {}", effect.effect_type(), effect.get_params());
            effect.process(buffer)?;
            if !buffer.is_finite() {
                return Err(PatchbayError::DspOverflow {
                    stage: effect.effect_type().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reset all stages
    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    /// Stage identifiers in processing order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.effect_type()).collect()
    }

    /// Settings of every stage, in order
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.effects
                .iter()
                .map(|e| serde_json::json!({ "type": e.effect_type(), "params": e.get_params() }))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{DelayParams, DistortionParams, NoiseParams, SubSineParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_patch() -> ParameterSet {
        ParameterSet {
            sub_sine: Some(SubSineParams::enabled(55.0, 0.5)),
            noise: Some(NoiseParams::enabled(0.01)),
            distortion: Some(DistortionParams::enabled(2.0)),
            delay: Some(DelayParams::enabled(60, 0.3)),
            global_lowpass: Some(6000.0),
            global_highpass: Some(30.0),
        }
    }

    #[test]
    fn test_fixed_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let chain = EffectChain::for_patch(&full_patch(), 0.75, 22050, &mut rng);
        assert_eq!(
            chain.stage_names(),
            vec![
                "sub_sine",
                "noise",
                "distortion",
                "global_lowpass",
                "global_highpass",
                "delay",
                "normalize"
            ]
        );
    }

    #[test]
    fn test_disabled_stages_skipped() {
        let mut params = full_patch();
        params.noise.as_mut().unwrap().enabled = false;
        params.delay = None;
        params.global_lowpass = None;

        let mut rng = StdRng::seed_from_u64(0);
        let chain = EffectChain::for_patch(&params, 0.75, 22050, &mut rng);
        assert_eq!(
            chain.stage_names(),
            vec!["sub_sine", "distortion", "global_highpass", "normalize"]
        );
    }

    #[test]
    fn test_normalizer_always_present() {
        let mut rng = StdRng::seed_from_u64(0);
        let chain = EffectChain::for_patch(&ParameterSet::default(), 0.75, 22050, &mut rng);
        assert_eq!(chain.stage_names(), vec!["normalize"]);
        assert_eq!(chain.to_json()[0]["type"], "normalize");
    }

    #[test]
    fn test_overflow_reported_with_stage() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut chain = EffectChain::for_patch(&ParameterSet::default(), 0.75, 22050, &mut rng);
        let mut buffer = AudioBuffer::new(vec![0.1, f32::INFINITY, 0.2], 22050);
        let err = chain.process(&mut buffer).unwrap_err();
        assert!(matches!(err, PatchbayError::DspOverflow { ref stage } if stage == "normalize"));
    }

    #[test]
    fn test_rerun_starts_from_clean_filter_state() {
        let params = ParameterSet {
            global_lowpass: Some(500.0),
            global_highpass: Some(40.0),
            ..Default::default()
        };
        let input = AudioBuffer::sine_wave(220.0, 0.5, 4096, 22050);
        let mut rng = StdRng::seed_from_u64(0);
        let mut chain = EffectChain::for_patch(&params, 0.75, 22050, &mut rng);

        let mut first = input.clone();
        chain.process(&mut first).unwrap();
        let mut second = input.clone();
        chain.process(&mut second).unwrap();
        assert!(first.is_identical_to(&second));
    }

    #[test]
    fn test_full_chain_output_bounded() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut chain = EffectChain::for_patch(&full_patch(), 0.5, 22050, &mut rng);
        let mut buffer = AudioBuffer::sine_wave(220.0, 0.9, 22050, 22050);
        chain.process(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 22050);
        assert!(buffer.peak() <= 0.95 + 1e-6);
    }
}
