//! Tool-call envelopes
//!
//! Planners send `{"tool": "synthesis_tool", "function": ..., "args": {...}}`,
//! sometimes wrapped in prose. These helpers unwrap the envelope, inject the
//! canonical paths and hand off to [`execute`].

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::PatchbayError;
use crate::gateway::call::{ToolResult, ARG_INPUT_PATH, ARG_OUTPUT_PATH};
use crate::gateway::executor::execute;

/// The only tool name accepted in an envelope
pub const TOOL_NAME: &str = "synthesis_tool";

static JSON_OBJECT_RE: Lazy<Regex> = Lazy::new(|| match Regex::new(r"(?s)\{.*\}") {
    Ok(re) => re,
    Err(e) => panic!("invalid JSON salvage pattern: {e}"),
});

/// Pull a JSON object out of noisy text
///
/// Parses the span from the first `{` to the last `}`; text without braces
/// is parsed whole. `None` if parsing fails.
pub fn extract_json_object(text: &str) -> Option<Value> {
    parse_salvaged(text).ok()
}

fn parse_salvaged(text: &str) -> serde_json::Result<Value> {
    let candidate = JSON_OBJECT_RE.find(text).map_or(text, |m| m.as_str());
    serde_json::from_str(candidate)
}

/// Handle a tool call given as text
pub fn handle_tool_call_str(text: &str, canonical_input: &Path, canonical_output: &Path) -> ToolResult {
    let text = text.trim();
    if text.is_empty() {
        return malformed("Empty tool call string");
    }
    match parse_salvaged(text) {
        Ok(call) => handle_tool_call(&call, canonical_input, canonical_output),
        Err(e) => malformed(&format!("Failed to parse tool call JSON: {}", e)),
    }
}

/// Handle a parsed tool call envelope
pub fn handle_tool_call(call: &Value, canonical_input: &Path, canonical_output: &Path) -> ToolResult {
    let Some(envelope) = call.as_object() else {
        return malformed("Tool call must be a JSON object");
    };

    match envelope.get("tool") {
        Some(Value::String(tool)) if tool == TOOL_NAME => {}
        other => {
            let tool = match other {
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
                None => "None".to_string(),
            };
            return ToolResult::failure(&PatchbayError::UnsupportedTool { tool });
        }
    }

    let function = match envelope.get("function") {
        Some(Value::String(f)) if !f.is_empty() => f.as_str(),
        _ => return malformed("Missing 'function' field in tool call"),
    };

    let mut args = match envelope.get("args") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return malformed("'args' must be an object"),
    };

    // The planner never chooses where bytes are read or written
    args.insert(
        ARG_INPUT_PATH.to_string(),
        Value::String(canonical_input.display().to_string()),
    );
    args.insert(
        ARG_OUTPUT_PATH.to_string(),
        Value::String(canonical_output.display().to_string()),
    );

    execute(function, &Value::Object(args), canonical_input, canonical_output)
}

fn malformed(reason: &str) -> ToolResult {
    ToolResult::failure(&PatchbayError::MalformedToolCall {
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn paths() -> (&'static Path, &'static Path) {
        (Path::new("in.wav"), Path::new("out.wav"))
    }

    #[test]
    fn test_extract_from_prose() {
        let text = "Sure! Here is the call:\n```json\n{\"tool\": \"synthesis_tool\", \"args\": {\"x\": {}}}\n```\nEnjoy.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["tool"], "synthesis_tool");
    }

    #[test]
    fn test_extract_failures() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{ broken").is_none());
        assert_eq!(extract_json_object("42"), Some(json!(42)));
    }

    #[test]
    fn test_empty_string() {
        let (i, o) = paths();
        let result = handle_tool_call_str("   ", i, o);
        assert_eq!(result.error.as_deref(), Some("Empty tool call string"));
    }

    #[test]
    fn test_unparseable_string() {
        let (i, o) = paths();
        let result = handle_tool_call_str("{not json}", i, o);
        assert!(result.error.unwrap().starts_with("Failed to parse tool call JSON:"));
    }

    #[test]
    fn test_wrong_tool() {
        let (i, o) = paths();
        let result = handle_tool_call(&json!({"tool": "shell", "function": "apply_patch"}), i, o);
        assert_eq!(result.error.as_deref(), Some("Unsupported tool: shell"));
        let result = handle_tool_call(&json!({"function": "apply_patch"}), i, o);
        assert_eq!(result.error.as_deref(), Some("Unsupported tool: None"));
    }

    #[test]
    fn test_missing_function() {
        let (i, o) = paths();
        let result = handle_tool_call(&json!({"tool": "synthesis_tool"}), i, o);
        assert_eq!(result.error.as_deref(), Some("Missing 'function' field in tool call"));
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidRequest));
    }

    #[test]
    fn test_args_must_be_object() {
        let (i, o) = paths();
        let result = handle_tool_call(
            &json!({"tool": "synthesis_tool", "function": "apply_patch", "args": "x"}),
            i,
            o,
        );
        assert_eq!(result.error.as_deref(), Some("'args' must be an object"));
    }

    #[test]
    fn test_disallowed_function_through_envelope() {
        let (i, o) = paths();
        let result = handle_tool_call(
            &json!({"tool": "synthesis_tool", "function": "rm_rf", "args": {}}),
            i,
            o,
        );
        assert_eq!(result.error.as_deref(), Some("Function rm_rf not allowed."));
    }
}
