//! Tool Gateway
//!
//! The trust boundary between an untrusted planner and the engine:
//! - static allow-list of operations
//! - argument validation and forced path confinement
//! - envelope parsing for raw planner output
//! - every failure returned as a structured `ToolResult`

mod call;
mod envelope;
mod executor;
mod registry;

pub use call::{
    PatchSource, ToolCall, ToolResult, ARG_INPUT_PATH, ARG_INSTRUCTIONS, ARG_OUTPUT_PATH,
    ARG_PARAMS, ARG_SEED,
};
pub use envelope::{extract_json_object, handle_tool_call, handle_tool_call_str, TOOL_NAME};
pub use executor::execute;
pub use registry::{function_names, Handler, APPLY_PATCH};
