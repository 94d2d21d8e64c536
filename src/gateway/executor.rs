//! Gateway executor
//!
//! `execute` is the trust boundary: it never returns an error or unwinds.
//! Every outcome, including a panic inside the engine, comes back as a
//! `ToolResult`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::engine::RenderOutput;
use crate::error::{PatchbayError, Result};
use crate::gateway::call::{ToolCall, ToolResult};
use crate::gateway::registry::{self, Handler};

/// Validate and run one allow-listed operation
///
/// Checks, in order: the function is allow-listed, `args` is an object,
/// both path arguments are present. Only then is the handler run, bound to
/// `canonical_input` and `canonical_output` whatever paths `args` named.
pub fn execute(
    function: &str,
    args: &Value,
    canonical_input: &Path,
    canonical_output: &Path,
) -> ToolResult {
    match try_execute(function, args, canonical_input, canonical_output) {
        Ok(output) => {
            info!(
                "{} ok -> {} [{}]",
                function,
                output.path.display(),
                output.params.enabled_stages().join(", ")
            );
            ToolResult::success(output)
        }
        Err(err) => {
            warn!(
                "{} rejected ({}): {} - {}",
                function,
                err.error_code(),
                err,
                err.recovery_hint()
            );
            ToolResult::failure(&err)
        }
    }
}

fn try_execute(
    function: &str,
    args: &Value,
    canonical_input: &Path,
    canonical_output: &Path,
) -> Result<RenderOutput> {
    let handler = registry::lookup(function).ok_or_else(|| PatchbayError::UnsupportedFunction {
        function: function.to_string(),
    })?;

    let empty = Map::new();
    let args = match args {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(PatchbayError::MalformedToolCall {
                reason: "'args' must be an object".to_string(),
            })
        }
    };

    let call = ToolCall::from_args(function, args, canonical_input, canonical_output)?;
    run_guarded(handler, &call)
}

/// Run a handler, converting a panic into `Internal`
fn run_guarded(handler: Handler, call: &ToolCall) -> Result<RenderOutput> {
    panic::catch_unwind(AssertUnwindSafe(|| handler(call))).unwrap_or_else(|payload| {
        Err(PatchbayError::Internal {
            reason: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_unknown_function_rejected_first() {
        // Even with malformed args the allow-list check wins
        let result = execute("rm_rf", &json!("junk"), Path::new("in.wav"), Path::new("out.wav"));
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("Function rm_rf not allowed."));
        assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedFunction));
    }

    #[test]
    fn test_non_object_args() {
        let result = execute("apply_patch", &json!([1, 2]), Path::new("in.wav"), Path::new("out.wav"));
        assert_eq!(result.error.as_deref(), Some("'args' must be an object"));
    }

    #[test]
    fn test_null_args_is_missing_paths() {
        let result = execute("apply_patch", &Value::Null, Path::new("in.wav"), Path::new("out.wav"));
        assert_eq!(result.error_kind(), Some(ErrorKind::MissingArgument));
    }

    #[test]
    fn test_panic_contained() {
        fn exploding(_: &ToolCall) -> Result<RenderOutput> {
            panic!("boom");
        }
        let call = ToolCall::from_args(
            "apply_patch",
            json!({"input_audio_path": "a", "out_path": "b"}).as_object().unwrap(),
            Path::new("in.wav"),
            Path::new("out.wav"),
        )
        .unwrap();
        let err = run_guarded(exploding, &call).unwrap_err();
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "handler panicked");
    }
}
