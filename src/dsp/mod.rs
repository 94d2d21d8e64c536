//! DSP stages
//!
//! Every stage implements the `Effect` trait and is assembled into the
//! fixed-order `EffectChain` for one render.

mod chain;
mod delay;
mod effect;
mod filter;
mod noise;
mod normalize;
mod saturation;
mod sub_sine;

pub use chain::EffectChain;
pub use delay::{apply_feedback, delay_samples, FeedbackDelay};
pub use effect::Effect;
pub use filter::{normalized_cutoff, ButterworthFilter, FilterKind, GlobalFilter};
pub use noise::{standard_normal, NoiseLayer};
pub use normalize::{SafetyNormalizer, TARGET_PEAK};
pub use saturation::SoftClip;
pub use sub_sine::SubSineLayer;
