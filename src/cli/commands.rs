//! CLI Command Implementations

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde_json::{json, Map, Value};

use crate::agent::interpret as interpret_text;
use crate::config::{ARG_MIX_RATIO, ARG_SAMPLE_RATE};
use crate::engine::write_fixtures;
use crate::gateway::{
    execute, function_names, handle_tool_call_str, ToolResult, APPLY_PATCH, ARG_INPUT_PATH,
    ARG_INSTRUCTIONS, ARG_OUTPUT_PATH, ARG_PARAMS, ARG_SEED,
};

/// Run a tool-call envelope given inline or as `@file`.
pub fn call(json_arg: &str, input: &Path, output: &Path) -> Result<ToolResult> {
    let text = match json_arg.strip_prefix('@') {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("reading tool call from {}", file))?,
        None => json_arg.to_string(),
    };
    info!("Handling tool call for {}", input.display());
    Ok(handle_tool_call_str(&text, input, output))
}

/// Render one file through `apply_patch`.
pub fn apply(
    input: &Path,
    output: &Path,
    instructions: Option<&str>,
    params: Option<&str>,
    sr: u32,
    mix: f32,
    seed: Option<u64>,
) -> Result<ToolResult> {
    let mut args = Map::new();
    args.insert(ARG_INPUT_PATH.into(), json!(input.display().to_string()));
    args.insert(ARG_OUTPUT_PATH.into(), json!(output.display().to_string()));
    args.insert(ARG_SAMPLE_RATE.into(), json!(sr));
    args.insert(ARG_MIX_RATIO.into(), json!(mix));

    if let Some(raw) = params {
        let parsed: Value = serde_json::from_str(raw).context("parsing --params JSON")?;
        args.insert(ARG_PARAMS.into(), parsed);
    }
    if let Some(text) = instructions {
        args.insert(ARG_INSTRUCTIONS.into(), json!(text));
    }
    if let Some(seed) = seed {
        args.insert(ARG_SEED.into(), json!(seed));
    }

    Ok(execute(APPLY_PATCH, &Value::Object(args), input, output))
}

/// Print the parameter set derived from instruction text.
pub fn interpret(text: &str, sr: u32) -> Result<()> {
    let params = interpret_text(text, sr);
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

/// Write the reference test sounds.
pub fn fixtures(dir: &Path, sr: u32, seed: u64) -> Result<()> {
    let written = write_fixtures(dir, sr, seed)
        .with_context(|| format!("writing fixtures to {}", dir.display()))?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// List allow-listed operations.
pub fn functions() -> Result<()> {
    for name in function_names() {
        println!("{}", name);
    }
    Ok(())
}

/// Print a tool result as JSON; returns whether it succeeded.
pub fn print_result(result: &ToolResult) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(result.ok)
}
