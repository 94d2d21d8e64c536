//! Patch parameters
//!
//! A `ParameterSet` names which effect stages run and with what settings.
//! Sets arrive from an untrusted planner or from the instruction
//! interpreter; either way they pass through [`ParameterSet::effective`]
//! before the engine touches audio. Numbers are clamped into range, never
//! rejected. Only structurally wrong input (wrong JSON types) is an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PatchbayError, Result};

/// Lowest frequency or cutoff accepted, in Hz
pub const MIN_FREQ_HZ: f64 = 20.0;

/// Highest frequency or cutoff accepted, in Hz
pub const MAX_FREQ_HZ: f64 = 20000.0;

pub const DEFAULT_SUB_FREQ_HZ: f64 = 55.0;
pub const DEFAULT_SUB_AMP: f64 = 0.5;

/// Amplitude of the sub-sine in the fallback patch
pub const FALLBACK_SUB_AMP: f64 = 0.4;

pub const DEFAULT_NOISE_AMP: f64 = 0.01;

pub const DEFAULT_DRIVE: f64 = 1.0;

pub const DEFAULT_DELAY_MS: u32 = 60;
pub const MIN_DELAY_MS: u32 = 10;
pub const MAX_DELAY_MS: u32 = 600;

pub const DEFAULT_FEEDBACK: f64 = 0.15;

/// Feedback ceiling, just below 1.0 so the delay recurrence always decays
pub const MAX_FEEDBACK: f64 = 1.0 - 1e-6;

/// Highest sub-sine frequency as a fraction of Nyquist; a sine at exactly
/// Nyquist samples to zero
pub const MAX_SUB_NYQUIST_FRACTION: f64 = 0.999;

/// Sub-sine layer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSineParams {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_sub_freq", alias = "ratio_freq_hz")]
    pub freq_hz: f64,
    #[serde(default = "default_sub_amp")]
    pub amp: f64,
    /// Lowpass applied to the sine alone before blending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowpass_cutoff: Option<f64>,
}

/// Additive Gaussian noise settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_noise_amp")]
    pub amp: f64,
}

/// Soft saturation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionParams {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_drive")]
    pub drive: f64,
}

/// Feedback delay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayParams {
    #[serde(default)]
    pub enabled: bool,
    /// Delay time; float input is rounded and clamped to 10-600
    #[serde(default = "default_delay_ms", deserialize_with = "deserialize_ms")]
    pub ms: u32,
    #[serde(default = "default_feedback")]
    pub feedback: f64,
}

/// Full description of one patch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_sine: Option<SubSineParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distortion: Option<DistortionParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelayParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_lowpass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_highpass: Option<f64>,
}

fn default_sub_freq() -> f64 {
    DEFAULT_SUB_FREQ_HZ
}

fn default_sub_amp() -> f64 {
    DEFAULT_SUB_AMP
}

fn default_noise_amp() -> f64 {
    DEFAULT_NOISE_AMP
}

fn default_drive() -> f64 {
    DEFAULT_DRIVE
}

fn default_delay_ms() -> u32 {
    DEFAULT_DELAY_MS
}

fn default_feedback() -> f64 {
    DEFAULT_FEEDBACK
}

fn deserialize_ms<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = f64::deserialize(deserializer)?;
    Ok(clamp_delay_ms(ms))
}

/// Round and clamp a delay time to the accepted range
pub fn clamp_delay_ms(ms: f64) -> u32 {
    if !ms.is_finite() {
        return DEFAULT_DELAY_MS;
    }
    ms.round().clamp(MIN_DELAY_MS as f64, MAX_DELAY_MS as f64) as u32
}

/// Clamp a value into `[min, max]`, replacing NaN/Inf with `default`
fn clamp_or(value: f64, min: f64, max: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Clamp a filter cutoff; zero, negative or non-finite means "off"
pub fn clamp_cutoff(cutoff: Option<f64>) -> Option<f64> {
    match cutoff {
        Some(hz) if hz.is_finite() && hz > 0.0 => Some(hz.clamp(MIN_FREQ_HZ, MAX_FREQ_HZ)),
        _ => None,
    }
}

impl SubSineParams {
    /// An enabled sub layer at the given frequency and amplitude
    pub fn enabled(freq_hz: f64, amp: f64) -> Self {
        Self {
            enabled: true,
            freq_hz,
            amp,
            lowpass_cutoff: None,
        }
    }

    fn clamped(&self, sample_rate: u32) -> Self {
        // Above Nyquist a sine aliases back down; at Nyquist it is silent
        let nyquist = sample_rate as f64 / 2.0;
        let ceiling = MAX_FREQ_HZ
            .min(nyquist * MAX_SUB_NYQUIST_FRACTION)
            .max(MIN_FREQ_HZ);
        Self {
            enabled: self.enabled,
            freq_hz: clamp_or(self.freq_hz, MIN_FREQ_HZ, ceiling, DEFAULT_SUB_FREQ_HZ.min(ceiling)),
            amp: clamp_or(self.amp, 0.0, 1.0, DEFAULT_SUB_AMP),
            lowpass_cutoff: clamp_cutoff(self.lowpass_cutoff),
        }
    }
}

impl NoiseParams {
    pub fn enabled(amp: f64) -> Self {
        Self { enabled: true, amp }
    }

    fn clamped(&self) -> Self {
        Self {
            enabled: self.enabled,
            amp: clamp_or(self.amp, 0.0, 1.0, DEFAULT_NOISE_AMP),
        }
    }
}

impl DistortionParams {
    pub fn enabled(drive: f64) -> Self {
        Self {
            enabled: true,
            drive,
        }
    }

    fn clamped(&self) -> Self {
        Self {
            enabled: self.enabled,
            drive: clamp_or(self.drive, 0.0, f64::INFINITY, DEFAULT_DRIVE),
        }
    }
}

impl DelayParams {
    pub fn enabled(ms: u32, feedback: f64) -> Self {
        Self {
            enabled: true,
            ms,
            feedback,
        }
    }

    fn clamped(&self) -> Self {
        Self {
            enabled: self.enabled,
            ms: self.ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS),
            feedback: clamp_or(self.feedback, 0.0, MAX_FEEDBACK, DEFAULT_FEEDBACK),
        }
    }
}

impl ParameterSet {
    /// The patch substituted when nothing else is enabled
    pub fn default_patch() -> Self {
        Self {
            sub_sine: Some(SubSineParams::enabled(DEFAULT_SUB_FREQ_HZ, FALLBACK_SUB_AMP)),
            ..Default::default()
        }
    }

    /// Parse a structured `params` object from a tool call
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PatchbayError::InvalidArgument {
                name: "params".to_string(),
                reason: format!("expected an object, got {}", value),
            });
        }
        Self::deserialize(value).map_err(|e| PatchbayError::InvalidArgument {
            name: "params".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn sub_sine_enabled(&self) -> bool {
        self.sub_sine.as_ref().is_some_and(|s| s.enabled)
    }

    pub fn noise_enabled(&self) -> bool {
        self.noise.as_ref().is_some_and(|n| n.enabled)
    }

    pub fn distortion_enabled(&self) -> bool {
        self.distortion.as_ref().is_some_and(|d| d.enabled)
    }

    pub fn delay_enabled(&self) -> bool {
        self.delay.as_ref().is_some_and(|d| d.enabled)
    }

    /// True if at least one stage would change the audio
    pub fn is_active(&self) -> bool {
        self.sub_sine_enabled()
            || self.noise_enabled()
            || self.distortion_enabled()
            || self.delay_enabled()
            || self.global_lowpass.is_some()
            || self.global_highpass.is_some()
    }

    /// Copy with every numeric field clamped into its valid range
    pub fn clamped(&self, sample_rate: u32) -> Self {
        Self {
            sub_sine: self.sub_sine.as_ref().map(|s| s.clamped(sample_rate)),
            noise: self.noise.as_ref().map(NoiseParams::clamped),
            distortion: self.distortion.as_ref().map(DistortionParams::clamped),
            delay: self.delay.as_ref().map(DelayParams::clamped),
            global_lowpass: clamp_cutoff(self.global_lowpass),
            global_highpass: clamp_cutoff(self.global_highpass),
        }
    }

    /// The set a render actually applies: clamped, or the default patch
    /// if nothing is left enabled
    pub fn effective(&self, sample_rate: u32) -> Self {
        let clamped = self.clamped(sample_rate);
        if clamped.is_active() {
            clamped
        } else {
            Self::default_patch().clamped(sample_rate)
        }
    }

    /// Names of the enabled stages, in pipeline order
    pub fn enabled_stages(&self) -> Vec<&'static str> {
        let mut stages = Vec::new();
        if self.sub_sine_enabled() {
            stages.push("sub_sine");
        }
        if self.noise_enabled() {
            stages.push("noise");
        }
        if self.distortion_enabled() {
            stages.push("distortion");
        }
        if self.global_lowpass.is_some() {
            stages.push("global_lowpass");
        }
        if self.global_highpass.is_some() {
            stages.push("global_highpass");
        }
        if self.delay_enabled() {
            stages.push("delay");
        }
        stages
    }
}
