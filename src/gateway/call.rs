//! Tool call and result types
//!
//! A `ToolCall` is built from an untrusted `args` object. The input and
//! output paths in `args` are only checked for presence; the values used
//! are always the caller-supplied canonical paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::interpret;
use crate::config::RenderSettings;
use crate::engine::RenderOutput;
use crate::error::{ErrorKind, PatchbayError, Result};
use crate::patch::ParameterSet;

pub const ARG_INPUT_PATH: &str = "input_audio_path";
pub const ARG_OUTPUT_PATH: &str = "out_path";
pub const ARG_PARAMS: &str = "params";
pub const ARG_INSTRUCTIONS: &str = "instructions";
pub const ARG_SEED: &str = "seed";

/// Where the patch for a call comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PatchSource {
    /// Structured parameters, used as given after clamping
    Params(ParameterSet),
    /// Free text for the interpreter (possibly empty)
    Instructions(String),
}

/// One validated render request
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub function: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub settings: RenderSettings,
    pub source: PatchSource,
    pub seed: Option<u64>,
}

impl ToolCall {
    /// Validate `args` and bind the call to the canonical paths
    ///
    /// # Errors
    /// * `MissingArgument` - `input_audio_path` or `out_path` is absent
    /// * `InvalidArgument` - a present argument has the wrong JSON type
    pub fn from_args(
        function: &str,
        args: &Map<String, Value>,
        canonical_input: &Path,
        canonical_output: &Path,
    ) -> Result<Self> {
        if !args.contains_key(ARG_INPUT_PATH) || !args.contains_key(ARG_OUTPUT_PATH) {
            return Err(PatchbayError::MissingArgument {
                names: format!("{} and {}", ARG_INPUT_PATH, ARG_OUTPUT_PATH),
            });
        }

        let settings = RenderSettings::from_args(args)?;

        let source = match args.get(ARG_PARAMS) {
            Some(value) if !value.is_null() => PatchSource::Params(ParameterSet::from_value(value)?),
            _ => PatchSource::Instructions(string_arg(args, ARG_INSTRUCTIONS)?.unwrap_or_default()),
        };

        Ok(Self {
            function: function.to_string(),
            input_path: canonical_input.to_path_buf(),
            output_path: canonical_output.to_path_buf(),
            settings,
            source,
            seed: seed_arg(args)?,
        })
    }

    /// The parameter set this call asks for, before engine fallback
    pub fn resolve_params(&self) -> ParameterSet {
        match &self.source {
            PatchSource::Params(params) => params.clamped(self.settings.sample_rate),
            PatchSource::Instructions(text) => interpret(text, self.settings.sample_rate),
        }
    }
}

fn string_arg(args: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(PatchbayError::InvalidArgument {
            name: name.to_string(),
            reason: format!("expected a string, got {}", other),
        }),
    }
}

fn seed_arg(args: &Map<String, Value>) -> Result<Option<u64>> {
    match args.get(ARG_SEED) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| PatchbayError::InvalidArgument {
            name: ARG_SEED.to_string(),
            reason: format!("expected a non-negative integer, got {}", value),
        }),
    }
}

/// Structured response returned across the gateway boundary
///
/// Serialises as `{"ok": true, "result": {...}}` or
/// `{"ok": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RenderOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    kind: Option<ErrorKind>,
}

impl ToolResult {
    pub fn success(output: RenderOutput) -> Self {
        Self {
            ok: true,
            result: Some(output),
            error: None,
            kind: None,
        }
    }

    pub fn failure(err: &PatchbayError) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }

    /// Error class of a failed call; `None` on success
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            let err = PatchbayError::from(e);
            serde_json::json!({ "ok": false, "error": err.to_string() })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn call(value: Value) -> Result<ToolCall> {
        ToolCall::from_args(
            "apply_patch",
            &args(value),
            Path::new("canon/in.wav"),
            Path::new("canon/out.wav"),
        )
    }

    #[test]
    fn test_missing_paths() {
        let err = call(json!({"input_audio_path": "a.wav"})).unwrap_err();
        assert_eq!(err.to_string(), "Missing required args: input_audio_path and out_path");
        assert_eq!(err.kind(), ErrorKind::MissingArgument);

        assert!(call(json!({"out_path": "b.wav"})).is_err());
    }

    #[test]
    fn test_embedded_paths_replaced() {
        let call = call(json!({
            "input_audio_path": "/etc/passwd",
            "out_path": "/etc/whatever.wav"
        }))
        .unwrap();
        assert_eq!(call.input_path, PathBuf::from("canon/in.wav"));
        assert_eq!(call.output_path, PathBuf::from("canon/out.wav"));
    }

    #[test]
    fn test_params_take_precedence() {
        let call = call(json!({
            "input_audio_path": "x", "out_path": "y",
            "instructions": "add noise",
            "params": {"distortion": {"enabled": true, "drive": 2.0}}
        }))
        .unwrap();
        assert!(matches!(call.source, PatchSource::Params(_)));
        let params = call.resolve_params();
        assert!(params.distortion_enabled());
        assert!(!params.noise_enabled());
    }

    #[test]
    fn test_instructions_interpreted() {
        let call = call(json!({
            "input_audio_path": "x", "out_path": "y",
            "instructions": "echo 200ms", "params": null
        }))
        .unwrap();
        assert_eq!(call.source, PatchSource::Instructions("echo 200ms".to_string()));
        assert_eq!(call.resolve_params().delay.unwrap().ms, 200);
    }

    #[test]
    fn test_defaults() {
        let call = call(json!({"input_audio_path": "x", "out_path": "y"})).unwrap();
        assert_eq!(call.settings, RenderSettings::default());
        assert_eq!(call.source, PatchSource::Instructions(String::new()));
        assert_eq!(call.seed, None);
        assert_eq!(call.resolve_params(), ParameterSet::default_patch());
    }

    #[test]
    fn test_wrong_types_rejected() {
        let err = call(json!({"input_audio_path": "x", "out_path": "y", "params": "sub"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(call(json!({"input_audio_path": "x", "out_path": "y", "instructions": 5})).is_err());
        assert!(call(json!({"input_audio_path": "x", "out_path": "y", "seed": -1})).is_err());
    }

    #[test]
    fn test_seed_read() {
        let call = call(json!({"input_audio_path": "x", "out_path": "y", "seed": 99})).unwrap();
        assert_eq!(call.seed, Some(99));
    }

    #[test]
    fn test_result_schema() {
        let err = PatchbayError::UnsupportedFunction {
            function: "rm_rf".to_string(),
        };
        let result = ToolResult::failure(&err);
        assert_eq!(
            result.to_json(),
            json!({"ok": false, "error": "Function rm_rf not allowed."})
        );
        assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedFunction));

        let ok = ToolResult::success(RenderOutput {
            path: PathBuf::from("out.wav"),
            params: ParameterSet::default_patch(),
        });
        assert_eq!(
            ok.to_json(),
            json!({
                "ok": true,
                "result": {
                    "path": "out.wav",
                    "params": {"sub_sine": {"enabled": true, "freq_hz": 55.0, "amp": 0.4}}
                }
            })
        );
    }
}
