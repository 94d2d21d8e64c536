//! Render settings
//!
//! Sample rate and mix ratio for one render. Both come from a tool call's
//! `args` object (or CLI flags) and are clamped rather than rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PatchbayError, Result};

/// Sample rate used when a call does not specify one
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Proportion of dry signal kept when a synthesized layer is blended in
pub const DEFAULT_MIX_RATIO: f32 = 0.75;

/// Lowest accepted render sample rate
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Highest accepted render sample rate
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// Argument key for the sample rate
pub const ARG_SAMPLE_RATE: &str = "sr";

/// Argument key for the mix ratio
pub const ARG_MIX_RATIO: &str = "mix_ratio";

/// Settings shared by every stage of a render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Rate the input is resampled to and the output is written at
    pub sample_rate: u32,
    /// Dry proportion in [0, 1]
    pub mix_ratio: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            mix_ratio: DEFAULT_MIX_RATIO,
        }
    }
}

impl RenderSettings {
    /// Create settings, clamping both values into range
    pub fn new(sample_rate: u32, mix_ratio: f32) -> Self {
        Self {
            sample_rate: sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE),
            mix_ratio: clamp_mix(mix_ratio),
        }
    }

    /// Read `sr` and `mix_ratio` from tool-call arguments
    ///
    /// Absent or null keys fall back to the defaults. A key holding a
    /// non-numeric value is a structural error.
    pub fn from_args(args: &Map<String, Value>) -> Result<Self> {
        let sample_rate = match number_arg(args, ARG_SAMPLE_RATE)? {
            Some(sr) if sr.is_finite() => sr.round().clamp(0.0, u32::MAX as f64) as u32,
            _ => DEFAULT_SAMPLE_RATE,
        };
        let mix_ratio = match number_arg(args, ARG_MIX_RATIO)? {
            Some(mix) => mix as f32,
            None => DEFAULT_MIX_RATIO,
        };
        Ok(Self::new(sample_rate, mix_ratio))
    }
}

fn clamp_mix(mix: f32) -> f32 {
    if mix.is_finite() {
        mix.clamp(0.0, 1.0)
    } else {
        DEFAULT_MIX_RATIO
    }
}

fn number_arg(args: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(PatchbayError::InvalidArgument {
            name: name.to_string(),
            reason: format!("expected a number, got {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults_when_absent() {
        let settings = RenderSettings::from_args(&Map::new()).unwrap();
        assert_eq!(settings, RenderSettings::default());
        assert_eq!(settings.sample_rate, 22050);
        assert_eq!(settings.mix_ratio, 0.75);
    }

    #[test]
    fn test_values_read_and_clamped() {
        let settings = RenderSettings::from_args(&args(json!({"sr": 44100, "mix_ratio": 0.6}))).unwrap();
        assert_eq!(settings.sample_rate, 44100);
        assert!((settings.mix_ratio - 0.6).abs() < 1e-6);

        let settings = RenderSettings::from_args(&args(json!({"sr": 100, "mix_ratio": 3.0}))).unwrap();
        assert_eq!(settings.sample_rate, MIN_SAMPLE_RATE);
        assert_eq!(settings.mix_ratio, 1.0);

        let settings = RenderSettings::from_args(&args(json!({"sr": 1e9, "mix_ratio": -1}))).unwrap();
        assert_eq!(settings.sample_rate, MAX_SAMPLE_RATE);
        assert_eq!(settings.mix_ratio, 0.0);
    }

    #[test]
    fn test_float_sample_rate_rounded() {
        let settings = RenderSettings::from_args(&args(json!({"sr": 22050.4}))).unwrap();
        assert_eq!(settings.sample_rate, 22050);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = RenderSettings::from_args(&args(json!({"sr": "fast"}))).unwrap_err();
        assert!(matches!(err, PatchbayError::InvalidArgument { ref name, .. } if name == "sr"));
    }
}
