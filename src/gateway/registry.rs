//! Operation allow-list
//!
//! A fixed table of name -> handler. Adding an operation means adding a
//! row here; nothing is looked up by reflection.

use crate::engine::{render, RenderOutput};
use crate::error::Result;
use crate::gateway::call::ToolCall;

/// Signature of every allow-listed operation
pub type Handler = fn(&ToolCall) -> Result<RenderOutput>;

/// The render operation
pub const APPLY_PATCH: &str = "apply_patch";

static REGISTRY: &[(&str, Handler)] = &[(APPLY_PATCH, apply_patch)];

/// Handler registered under `name`
pub fn lookup(name: &str) -> Option<Handler> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, handler)| *handler)
}

/// Names of all allow-listed operations
pub fn function_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

fn apply_patch(call: &ToolCall) -> Result<RenderOutput> {
    let params = call.resolve_params();
    render(
        &call.input_path,
        &call.output_path,
        &params,
        &call.settings,
        call.seed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_operation() {
        assert_eq!(function_names(), vec!["apply_patch"]);
        assert!(lookup("apply_patch").is_some());
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(lookup("rm_rf").is_none());
        assert!(lookup("Apply_Patch").is_none());
        assert!(lookup("apply_patch ").is_none());
        assert!(lookup("").is_none());
    }
}
